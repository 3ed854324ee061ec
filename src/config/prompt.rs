//! Interactive job entry, used when no configuration is passed on the CLI.

use anyhow::{bail, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use super::{ArtistAlbums, HuntConfig};

/// Something that can ask the user for one line of input.
pub trait LineSource {
    /// Returns the entered line; `default` is pre-filled where supported.
    /// End of input is reported as an empty line.
    fn read_line(&mut self, prompt: &str, default: &str) -> Result<String>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str, default: &str) -> Result<String> {
        match self.readline_with_initial(prompt, (default, "")) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Eof) => Ok(String::new()),
            Err(ReadlineError::Interrupted) => bail!("Interrupted"),
            Err(e) => Err(e.into()),
        }
    }
}

/// Split a comma separated album list. Commas inside double quotes are kept.
pub fn parse_albums(input: &str) -> Vec<String> {
    let mut albums = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => albums.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    albums.push(current);

    albums
        .into_iter()
        .map(|album| album.trim().to_string())
        .filter(|album| !album.is_empty())
        .collect()
}

fn optional(line: String) -> Option<String> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn yes_no(line: &str, default: bool) -> bool {
    match line.trim().to_lowercase().as_str() {
        "" => default,
        "yes" | "y" => true,
        "no" | "n" => false,
        _ => default,
    }
}

/// Ask for every field of a [`HuntConfig`].
pub fn prompt_config(input: &mut dyn LineSource) -> Result<HuntConfig> {
    let release_type = optional(input.read_line(
        "Please enter the release type (e.g., Album, Single, or press Enter for all): ",
        "",
    )?);
    let status = optional(input.read_line(
        "Please enter the release status (e.g., Official, Promotion, or press Enter for all): ",
        "",
    )?);
    let save_images = yes_no(
        &input.read_line("Would you like to save the images? (yes/no) [no]: ", "no")?,
        false,
    );
    let output_dir = optional(input.read_line(
        "Please enter the output directory (or press Enter for current directory): ",
        "",
    )?)
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."));
    let skip_existing = yes_no(
        &input.read_line("Would you like to skip existing images? (yes/no) [yes]: ", "yes")?,
        true,
    );

    let mut artists_albums = Vec::new();
    loop {
        let Some(artist) =
            optional(input.read_line("Please enter the artist name (or press Enter to finish): ", "")?)
        else {
            break;
        };
        let albums = parse_albums(&input.read_line(
            "Please enter the album names (comma separated, or use quotes for names with commas): ",
            "",
        )?);
        artists_albums.push(ArtistAlbums { artist, albums });
    }

    let config = HuntConfig {
        artists_albums,
        release_type,
        status,
        save_images,
        output_dir,
        skip_existing,
    };
    config.validate()?;
    Ok(config)
}
