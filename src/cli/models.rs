use console::style;
use framecast::errors::FramecastError;
use framecast::provider::{ModelCatalog, ModelDescriptor, ModelType};

use super::commands::ModelsArgs;

pub fn handle_models(args: ModelsArgs) -> Result<(), FramecastError> {
    let catalog = ModelCatalog::builtin();
    let models: Vec<&ModelDescriptor> = match args.model_type.as_deref() {
        Some(raw) => {
            let model_type = ModelType::parse(raw)
                .ok_or_else(|| FramecastError::ValidationFailed(format!("unknown model type: {}", raw)))?;
            catalog.list_by_type(model_type)
        }
        None => catalog.all().iter().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<16} {:>8} {:>8}  {}",
        style("KEY").bold(),
        style("TYPE").bold(),
        style("COST").bold(),
        style("AVG").bold(),
        style("PROVIDER MODEL").bold(),
    );
    for model in models {
        println!(
            "{:<24} {:<16} {:>8} {:>7}s  {}",
            model.key,
            model.model_type,
            format!("${:.2}", model.cost_per_run),
            model.avg_duration_seconds,
            style(model.provider_id).dim(),
        );
    }
    Ok(())
}
