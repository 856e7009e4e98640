//! Diagnostic binary for verifying the Gemini key pool and model access
//! This is a utility binary, not part of the main application

use chat_proxy_backend::config::{load_dotenv, Config};
use chat_proxy_backend::credentials::{CredentialPool, KEY_LIST_VARS};
use chat_proxy_backend::provider::gemini::GeminiClient;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Checking Gemini configuration...\n");

    // Test 1: Check which environment files were found
    println!("1. Loading environment files...");
    let loaded = load_dotenv();
    if loaded.is_empty() {
        println!("   ⚠ No .env.local or .env file found, using process environment only");
    } else {
        for path in &loaded {
            println!("   ✓ Loaded {}", path.display());
        }
    }

    // Test 2: Inspect the credential pool without printing secrets
    println!("\n2. Inspecting credential pool...");
    for var in KEY_LIST_VARS {
        let state = if env::var(var).is_ok() { "defined" } else { "undefined" };
        println!("   {} is {}", var, state);
    }

    let config = Config::from_env();
    let pool = CredentialPool::from_config(&config.provider);
    if pool.is_empty() {
        eprintln!("   ✗ No API key found");
        eprintln!("   Set GOOGLE_GENERATIVE_AI_API_KEYS=\"key1,key2\" or GOOGLE_GENERATIVE_AI_API_KEY=\"key\"");
        anyhow::bail!("no API key configured");
    }
    println!("   ✓ {} key(s) available", pool.len());
    for masked in pool.masked_keys() {
        println!("     - {}", masked);
    }

    // Test 3: List models that support generateContent
    println!("\n3. Listing models that support generateContent...");
    let key = pool
        .select_key(&mut rand::rng())
        .map(str::to_owned)
        .ok_or_else(|| anyhow::anyhow!("credential pool became empty"))?;
    let client = GeminiClient::new(reqwest::Client::new(), config.provider.base_url.clone());

    match client.list_models(&key).await {
        Ok(models) if models.is_empty() => {
            println!("   ⚠ No models support generateContent for this key");
        }
        Ok(models) => {
            for model in models {
                println!("   {}", model);
            }
        }
        Err(e) => {
            eprintln!("   ✗ Failed to list models: {}", e);
            return Err(e.into());
        }
    }

    println!("\n✓ All checks completed!");
    Ok(())
}
