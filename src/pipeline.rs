//! Reading token files from disk and writing what is generated from them.

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use tracing::{info, warn};
use uds_design_tokens_core::{
    css, figma, flatten,
    tailwind::{self, ConfigFile},
    validate, Diagnostics, Document, PaletteExtractor, Report, Result, TokenError, TokenStore,
    UnresolvedPolicy,
};

use crate::config::Config;

/// Names of the files in `dir`, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(TokenError::MissingInputDir(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| TokenError::io(dir, source))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TokenError::io(dir, source))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!(?name, "skipping file with non UTF-8 name"),
        }
    }
    names.sort();
    Ok(names)
}

pub fn read_document(dir: &Path, name: &str) -> Result<Document> {
    let path = dir.join(name);
    let text = fs::read_to_string(&path).map_err(|source| TokenError::io(&path, source))?;
    Document::parse(name, &text)
}

fn read_documents(dir: &Path, names: &[String]) -> Result<Vec<Document>> {
    names.iter().map(|name| read_document(dir, name)).collect()
}

/// Writes `contents`, creating missing parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| TokenError::io(parent, source))?;
    }
    fs::write(path, contents).map_err(|source| TokenError::io(path, source))
}

fn report_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        warn!("{diagnostic}");
    }
    if !diagnostics.is_empty() {
        warn!(count = diagnostics.len(), "tokens did not resolve cleanly");
    }
}

/// The stylesheet for the default document set. Unresolved aliases are kept
/// verbatim and reported. A directory with no token files is an error so an
/// existing stylesheet is never replaced by an empty one.
pub fn render_css(config: &Config) -> Result<String> {
    let dir = &config.input.dir;
    let names = config.selection().select(&list_files(dir)?);
    if names.is_empty() {
        return Err(TokenError::NoTokenFiles(dir.clone()));
    }
    info!(files = %names.iter().join(", "), "load order");
    let store = TokenStore::from_documents(read_documents(dir, &names)?);

    let mut diagnostics = Diagnostics::new();
    let tokens = flatten(&store.resolver(UnresolvedPolicy::Keep), &mut diagnostics);
    report_diagnostics(&diagnostics);
    info!(tokens = tokens.len(), "flattened tokens");
    Ok(css::emit(&tokens))
}

pub fn write_css(config: &Config, stylesheet: &str) -> Result<PathBuf> {
    let path = config.css.output.clone();
    write_output(&path, stylesheet)?;
    info!(path = %path.display(), "wrote stylesheet");
    Ok(path)
}

pub fn build_css(config: &Config) -> Result<PathBuf> {
    let stylesheet = render_css(config)?;
    write_css(config, &stylesheet)
}

/// Every brand namespace at the top of the primitives document.
pub fn brands(primitives: &Document, reserved: &[String]) -> Vec<String> {
    primitives
        .root
        .keys()
        .filter(|key| !reserved.contains(*key))
        .cloned()
        .collect()
}

/// The base config and one config per brand, all rendered in memory.
pub fn render_tailwind(config: &Config) -> Result<Vec<ConfigFile>> {
    let dir = &config.input.dir;
    if !dir.is_dir() {
        return Err(TokenError::MissingInputDir(dir.clone()));
    }
    let primitives = read_document(dir, &config.tailwind.primitives)?;
    let core = read_document(dir, &config.tailwind.core)?;
    let brands = brands(&primitives, &config.tailwind.reserved_namespaces);
    info!(brands = %brands.iter().join(", "), "found brands");

    let store = TokenStore::from_documents([primitives, core]);
    let extractor = PaletteExtractor::new(
        store.resolver(UnresolvedPolicy::DeriveFromPath),
        &config.tailwind.primitives,
    );
    let mut diagnostics = Diagnostics::new();
    let files = tailwind::generate(&extractor, &brands, &mut diagnostics)?;
    report_diagnostics(&diagnostics);
    Ok(files)
}

pub fn write_tailwind(config: &Config, files: &[ConfigFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = config.tailwind.output_dir.join(&file.file_name);
        write_output(&path, &file.contents)?;
        info!(path = %path.display(), "wrote tailwind config");
        written.push(path);
    }
    Ok(written)
}

pub fn generate_tailwind(config: &Config) -> Result<Vec<PathBuf>> {
    let files = render_tailwind(config)?;
    write_tailwind(config, &files)
}

/// Stylesheet and Tailwind configs; nothing is written unless both render.
pub fn build_all(config: &Config) -> Result<Vec<PathBuf>> {
    let stylesheet = render_css(config)?;
    let files = render_tailwind(config)?;
    let mut written = vec![write_css(config, &stylesheet)?];
    written.extend(write_tailwind(config, &files)?);
    Ok(written)
}

/// Checks every token file in the input directory, variants included.
pub fn validate_tokens(config: &Config) -> Result<Report> {
    let dir = &config.input.dir;
    let names = config.selection().order(&list_files(dir)?);
    info!(files = names.len(), "validating token files");
    let documents = read_documents(dir, &names)?;
    Ok(validate(&documents))
}

/// Splits a Figma variables export into token files in the input directory.
pub fn transform_figma(config: &Config, response: Option<&Path>) -> Result<Vec<PathBuf>> {
    let source = response.unwrap_or(&config.figma.response);
    let text = fs::read_to_string(source).map_err(|source_err| TokenError::io(source, source_err))?;
    let response = figma::parse_response(&source.display().to_string(), &text)?;

    let files = figma::transform(&response)
        .into_iter()
        .map(|file| -> Result<(String, String)> {
            Ok((file.file_name.clone(), file.to_pretty_json()?))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut written = Vec::with_capacity(files.len());
    for (file_name, contents) in files {
        let path = config.input.dir.join(file_name);
        write_output(&path, &contents)?;
        info!(path = %path.display(), "wrote token file");
        written.push(path);
    }
    Ok(written)
}
