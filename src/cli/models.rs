use anyhow::Result;

use super::ModelArgs;

/// List discovered models in scoring order
pub fn run(model_args: ModelArgs) -> Result<()> {
    let config = model_args.load_config()?;
    let registry = model_args.discover(&config)?;

    if registry.is_empty() {
        println!("No models found");
        return Ok(());
    }

    println!("{} model(s):", registry.len());
    for model in registry.iter() {
        println!("  {:<24} {}", model.name, model.path.display());
    }
    Ok(())
}
