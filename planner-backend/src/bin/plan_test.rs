//! Discovery Test Fixture
//!
//! A minimal harness for poking a running planner without a frontend.
//!
//! Usage:
//!   TEST_CHILD_AGE=8 \
//!   TEST_INTERESTS="science,art" \
//!   TEST_BUDGET=moderate \
//!   cargo run --bin plan_test

use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

async fn run_discovery(client: &Client, server: &str, request: &Value) -> Result<(), String> {
    println!("\n==========================================================");
    println!("📤 Sending request to {}/api/discover-activities", server);
    println!("==========================================================");
    println!("{}", serde_json::to_string_pretty(request).unwrap_or_default());

    let response = client
        .post(format!("{}/api/discover-activities", server))
        .json(request)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;

    println!("\n📥 Response (status: {}):", status);
    match serde_json::from_str::<Value>(&body) {
        Ok(pretty) => println!("{}", serde_json::to_string_pretty(&pretty).unwrap_or(body.clone())),
        Err(_) => println!("{}", body),
    }

    if !status.is_success() {
        return Err(format!("Server returned {}", status));
    }

    let parsed: Value =
        serde_json::from_str(&body).map_err(|e| format!("Failed to parse response: {}", e))?;

    println!("\n📊 Plan summary:");
    println!("   total_found:     {}", parsed["total_found"]);
    println!("   age_appropriate: {}", parsed["age_appropriate"]);
    if let Some(tasks) = parsed["task_log"].as_array() {
        for t in tasks {
            println!(
                "   task {} -> {} ({}ms)",
                t["task"].as_str().unwrap_or("?"),
                t["status"].as_str().unwrap_or("?"),
                t["elapsed_ms"]
            );
        }
    }
    if let Some(activities) = parsed["activities"].as_array() {
        println!("\n🎯 Ranked activities ({}):", activities.len());
        for a in activities {
            println!(
                "   - {} at {}, {} ({})",
                a["name"].as_str().unwrap_or("?"),
                a["venue"].as_str().unwrap_or("?"),
                a["address"].as_str().unwrap_or("?"),
                a["price_label"].as_str().unwrap_or("?")
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    println!("🧭 Activity Discovery Fixture");
    println!("=============================\n");

    // Read environment variables
    let server = env_or("TEST_SERVER_URL", "http://localhost:8080");
    let child_age: u8 = env_or("TEST_CHILD_AGE", "8").parse().unwrap_or_else(|_| {
        eprintln!("❌ TEST_CHILD_AGE must be a number");
        std::process::exit(1);
    });
    let location = env_or("TEST_LOCATION", "Cleveland, OH");
    let interests: Vec<String> = env_or("TEST_INTERESTS", "science,art")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let budget = env_or("TEST_BUDGET", "moderate");
    let date_range = env_or("TEST_DATE_RANGE", "next_2_weeks");

    println!("📝 Configuration:");
    println!("   Server:    {}", server);
    println!("   Child age: {}", child_age);
    println!("   Location:  {}", location);
    println!("   Interests: {:?}", interests);
    println!("   Budget:    {}", budget);
    println!("   Dates:     {}", date_range);

    let request = json!({
        "child_age": child_age,
        "location": location,
        "interests": interests,
        "budget_tier": budget,
        "date_range": date_range,
    });

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client");

    match run_discovery(&client, &server, &request).await {
        Ok(()) => {
            println!("\n==========================================================");
            println!("🎉 SUCCESS");
            println!("==========================================================");
        }
        Err(e) => {
            println!("\n==========================================================");
            println!("❌ ERROR");
            println!("==========================================================");
            println!("{}", e);
            std::process::exit(1);
        }
    }
}
