//! Reads a response definition document and prints the body it resolves to.
//!
//! ```text
//! cargo run --example resolve_definition -- <definition.json> [files-root]
//! ```
//!
//! Body files and `file` data store references are read under `files-root`, which defaults
//! to the directory of the definition.

use micro_stub::resolve::{FsFileSource, RenderContext, Resolver};
use micro_stub::ResponseDefinition;
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut args = std::env::args().skip(1);
    let Some(definition_path) = args.next().map(PathBuf::from) else {
        error!("usage: resolve_definition <definition.json> [files-root]");
        return;
    };
    let files_root = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| definition_path.parent().map(Path::to_path_buf).unwrap_or_default());

    let document = match std::fs::read_to_string(&definition_path) {
        Ok(document) => document,
        Err(e) => {
            error!(cause = %e, path = %definition_path.display(), "read definition error");
            return;
        }
    };

    let definition = match ResponseDefinition::from_json(&document) {
        Ok(definition) => definition,
        Err(e) => {
            error!(cause = %e, "parse definition error");
            return;
        }
    };

    info!(status = definition.status(), root = %files_root.display(), "resolving body");
    let resolver = Resolver::builder().files(FsFileSource::new(files_root)).build();
    let body = resolver.resolve(&definition, &RenderContext::empty());

    if !body.is_present() {
        info!("definition resolves to no body");
        return;
    }

    let content_type = body.content_type().map(|mime| mime.to_string()).unwrap_or_default();
    info!(json = body.is_json(), binary = body.is_binary(), content_type = %content_type, "resolved body");
    match body.as_base64() {
        Some(base64) if body.is_binary() => println!("{base64}"),
        _ => println!("{}", body.as_string()),
    }
}
