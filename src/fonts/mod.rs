//! Font resolution for report rendering.
//!
//! Lookup order:
//! 1. an explicit font file (`--font`), used for every style;
//! 2. the bundled Roboto family, searched in `REKAP_FONTS_DIR`, next to the
//!    executable and in the crate's `assets/fonts`;
//! 3. a system family (DejaVu Sans on Linux, Arial on Windows).

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable overriding the bundled font directory.
pub const FONTS_DIR_ENV: &str = "REKAP_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

struct SystemFamily {
    name: &'static str,
    directories: &'static [&'static str],
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "DejaVu Sans",
        directories: &[
            "/usr/share/fonts/truetype/dejavu",
            "/usr/share/fonts/dejavu",
            "/usr/share/fonts/TTF",
        ],
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
    SystemFamily {
        name: "Arial",
        directories: &["C:\\Windows\\Fonts"],
        regular: "arial.ttf",
        bold: "arialbd.ttf",
        italic: "ariali.ttf",
        bold_italic: "arialbi.ttf",
    },
];

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            "directory missing".to_owned()
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} font directory. Checked: {}. Set {} or pass --font.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_font(path: &Path, style: &str) -> Result<FontData, Error> {
    FontData::load(path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load {} font at {}: {}", style, path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

/// Uses a single font file for all four styles.
pub fn font_family_from_file(path: impl AsRef<Path>) -> Result<FontFamily<FontData>, Error> {
    let path = path.as_ref();
    Ok(FontFamily {
        regular: load_font(path, "regular")?,
        bold: load_font(path, "bold")?,
        italic: load_font(path, "italic")?,
        bold_italic: load_font(path, "bold italic")?,
    })
}

fn load_bundled_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory()?;
    debug!("loading {} fonts from {}", DEFAULT_FONT_FAMILY_NAME, directory.display());

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn system_font_family() -> Result<FontFamily<FontData>, Error> {
    for family in SYSTEM_FAMILIES {
        let Some(directory) = family
            .directories
            .iter()
            .map(Path::new)
            .find(|dir| dir.join(family.regular).is_file())
        else {
            continue;
        };

        let loaded = (|| -> Result<FontFamily<FontData>, Error> {
            Ok(FontFamily {
                regular: load_font(&directory.join(family.regular), "regular")?,
                bold: load_font(&directory.join(family.bold), "bold")?,
                italic: load_font(&directory.join(family.italic), "italic")?,
                bold_italic: load_font(&directory.join(family.bold_italic), "bold italic")?,
            })
        })();

        match loaded {
            Ok(fonts) => {
                warn!("Falling back to system font family '{}'", family.name);
                return Ok(fonts);
            }
            Err(err) => debug!("system family '{}' unusable: {}", family.name, err),
        }
    }

    Err(Error::new(
        "No system font family available for fallback",
        io::Error::new(io::ErrorKind::NotFound, "system fonts not found"),
    ))
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns the bundled Roboto family, falling back to a system family when the
/// bundled files are missing.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family() {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_font_family() {
            Ok(fallback) => Ok(fallback),
            Err(fallback_err) => {
                warn!(
                    "Bundled fonts unavailable ({}); system fallback failed: {}",
                    err, fallback_err
                );
                Err(Error::new(
                    format!(
                        "Bundled fonts unavailable and system fallback failed: {}",
                        fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Resolves the family used for a report: the explicit file when given,
/// otherwise [`default_font_family`].
pub fn report_font_family(font_path: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    match font_path {
        Some(path) => font_family_from_file(path),
        None => default_font_family(),
    }
}

/// Indicates whether a font family can be resolved without an explicit file.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
        || SYSTEM_FAMILIES.iter().any(|family| {
            family
                .directories
                .iter()
                .any(|dir| Path::new(dir).join(family.regular).is_file())
        })
}
