//! Prompts-related command implementations

use anyhow::Result;
use mmcat_core::prompts::{default_prompts_dir, PromptId, PromptLibrary};

/// Show the categorization prompt, or only the override directory
pub fn cmd_prompts(path_only: bool) -> Result<()> {
    if path_only {
        return cmd_prompts_path();
    }

    let library = PromptLibrary::new();
    let id = PromptId::CategorizeTransactions;
    let prompt = library.get(id)?;

    println!("Prompt: {}", prompt.metadata.id);
    println!("Version: {}", prompt.metadata.version);
    println!(
        "Source: {}",
        if prompt.is_override() {
            "Override"
        } else {
            "Default"
        }
    );
    if let Some(path) = library.override_path(id) {
        println!("Override Path: {}", path.display());
    }

    println!();
    println!("--- Content ---");
    println!("{}", prompt.content);

    Ok(())
}

/// Show the path where prompt overrides should be placed
pub fn cmd_prompts_path() -> Result<()> {
    match default_prompts_dir() {
        Some(path) => {
            println!("{}", path.display());

            if !path.exists() {
                eprintln!();
                eprintln!("Note: This directory does not exist yet.");
                eprintln!(
                    "Create it and add {}.md to customize the prompt.",
                    PromptId::CategorizeTransactions.as_str()
                );
            }
        }
        None => {
            eprintln!("Could not determine prompts directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}
