use std::fs::File;
use std::io::BufWriter;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lexgraph::migrate::Pipeline;
use lexgraph::settings::{Settings, open_store};
use lexgraph::vocabulary::RelationVocabulary;
use lexgraph::{Result, ntriples, record};

fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Could not load settings: {}", e);
            std::process::exit(2);
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(&settings) {
        error!(error = %e, "migration failed");
        std::process::exit(1);
    }
}

fn run(settings: &Settings) -> Result<()> {
    let store = open_store(&settings.store)?;
    info!(backend = ?settings.store.backend, input = %settings.migration.input_dir.display(), "starting migration");
    let records = record::load_directory(&settings.migration.input_dir, settings.migration.separator())?;
    let report = Pipeline::new(store.as_ref(), RelationVocabulary::dannet()).run(&records)?;
    if let Some(path) = &settings.migration.export {
        let triples = store.triples()?;
        ntriples::write(&triples, BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), triples = triples.len(), "exported n-triples");
    }
    match serde_json::to_string_pretty(&report) {
        Ok(json) => info!(report = %json, "migration report"),
        Err(e) => error!(error = %e, "could not serialize migration report"),
    }
    Ok(())
}
