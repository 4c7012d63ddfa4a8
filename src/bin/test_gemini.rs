//! Test binary for verifying Gemini API connectivity
//! This is a utility binary, not part of the main application

use deep_research_backend::llm::client::{generate_content, GEMINI_API_BASE_URL};
use std::env;
use tokio::time::{timeout, Duration};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Testing Gemini API from Rust...\n");

    // Test 1: Check if API key is available
    println!("1. Checking for GEMINI_API_KEY environment variable...");
    let api_key = match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            println!("   ✓ GEMINI_API_KEY is set (length: {} chars)", key.len());
            key
        }
        _ => {
            eprintln!("   ✗ GEMINI_API_KEY not found in environment");
            eprintln!("   Make sure to export it: export GEMINI_API_KEY=\"your-key\"");
            return Err("GEMINI_API_KEY not set".into());
        }
    };

    let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
    println!("\n2. Using model: {}", model);

    // Test 2: Execute a plain-text query (with timeout)
    println!("\n3. Executing test query...");
    println!("   Query: 'What is 2+2? Answer in one sentence.'");

    let client = reqwest::Client::new();
    let call = generate_content(
        &client,
        GEMINI_API_BASE_URL,
        &api_key,
        &model,
        "What is 2+2? Answer in one sentence.",
        false,
    );

    match timeout(Duration::from_secs(30), call).await {
        Ok(Ok(response)) => {
            println!("   ✓ Response received:");
            println!("   {}", response.trim());
        }
        Ok(Err(e)) => {
            eprintln!("   ✗ Query failed: {}", e);
            eprintln!("\n   Troubleshooting:");
            eprintln!("   - Make sure GEMINI_API_KEY is valid: echo $GEMINI_API_KEY");
            eprintln!("   - Check the model name: {}", model);
            return Err(e.to_string().into());
        }
        Err(_) => {
            eprintln!("   ✗ Query timed out after 30 seconds");
            return Err("timeout".into());
        }
    }

    // Test 3: Execute a JSON-mode query (what the planner and writer use)
    println!("\n4. Executing JSON-mode query...");
    let call = generate_content(
        &client,
        GEMINI_API_BASE_URL,
        &api_key,
        &model,
        "Return a JSON object with a single key \"answer\" whose value is the number 4.",
        true,
    );

    match timeout(Duration::from_secs(30), call).await {
        Ok(Ok(response)) => {
            println!("   ✓ Response received:");
            println!("   {}", response.trim());
        }
        Ok(Err(e)) => {
            eprintln!("   ✗ JSON-mode query failed: {}", e);
            return Err(e.to_string().into());
        }
        Err(_) => {
            eprintln!("   ✗ Query timed out after 30 seconds");
            return Err("timeout".into());
        }
    }

    println!("\n✓ All tests completed!");
    Ok(())
}
