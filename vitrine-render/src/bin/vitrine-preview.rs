use std::env;
use std::process;
use tracing_subscriber::EnvFilter;
use vitrine_render::{RenderError, TemplateDispatcher};
use vitrine_sections::{
    resolve_profile, BusinessProfile, EngineConfig, EngineError, SchemaRegistry, TemplateConfig,
};

struct Options {
    profile: String,
    config: Option<String>,
    template: Option<String>,
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(args.get(1..).unwrap_or_default()) {
        Some(options) => options,
        None => {
            eprintln!(
                "Usage: vitrine-preview <profile.yaml|profile.json> [--config engine.yaml] [--template template.yaml] [--json]"
            );
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  vitrine-preview salon.yaml > salon.html");
            eprintln!("  vitrine-preview salon.yaml --config engine.yaml --json");
            eprintln!("  vitrine-preview salon.yaml --template spring-layout.yaml");
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("✗ {} could not be rendered:", options.profile);
        print_error(&e);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut profile = None;
    let mut config = None;
    let mut template = None;
    let mut json = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--config" => config = Some(iter.next()?.clone()),
            "--template" => template = Some(iter.next()?.clone()),
            flag if flag.starts_with("--") => return None,
            path if profile.is_none() => profile = Some(path.to_string()),
            _ => return None,
        }
    }
    Some(Options {
        profile: profile?,
        config,
        template,
        json,
    })
}

fn run(options: &Options) -> Result<(), RenderError> {
    let config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut profile = BusinessProfile::load(&options.profile)?;
    if let Some(path) = &options.template {
        profile.template = TemplateConfig::load(path)?;
    }
    let page = resolve_profile(&profile, &config, SchemaRegistry::builtin())?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        let rendered = TemplateDispatcher::builtin().render(&page)?;
        print!("{}", rendered.html);
    }
    Ok(())
}

fn print_error(error: &RenderError) {
    match error {
        RenderError::Engine(EngineError::Io { path, source }) => {
            eprintln!("  Failed to read '{}':", path);
            eprintln!("    {}", source);
        }
        RenderError::Engine(EngineError::Yaml(e)) => {
            eprintln!("  YAML error:");
            eprintln!("    {}", e);
        }
        RenderError::Engine(EngineError::Json(e)) => {
            eprintln!("  JSON error:");
            eprintln!("    {}", e);
        }
        RenderError::Engine(EngineError::InvalidBaseUrl { url, reason }) => {
            eprintln!("  Invalid asset_base_url '{}':", url);
            eprintln!("    {}", reason);
        }
        RenderError::Engine(other) => {
            eprintln!("  {}", other);
        }
        RenderError::Json(e) => {
            eprintln!("  Failed to serialize output:");
            eprintln!("    {}", e);
        }
        RenderError::Format(e) => {
            eprintln!("  Failed to write HTML:");
            eprintln!("    {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["shop.yaml", "--template", "t.yaml", "--json"])).unwrap();
        assert_eq!(options.profile, "shop.yaml");
        assert_eq!(options.template.as_deref(), Some("t.yaml"));
        assert_eq!(options.config, None);
        assert!(options.json);
    }

    #[test]
    fn test_parse_args_rejects_incomplete_input() {
        let empty: Vec<String> = Vec::new();
        assert!(parse_args(empty.get(1..).unwrap_or_default()).is_none());
        assert!(parse_args(&args(&["--config"])).is_none());
        assert!(parse_args(&args(&["a.yaml", "b.yaml"])).is_none());
    }
}
