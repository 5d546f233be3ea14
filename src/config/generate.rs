//! `[generate]` section configuration.
//!
//! Controls how the reference is written: one file per entity or a single
//! document, the markup format, worker count and the tag file.

use super::defaults;
use crate::render::{Format, RenderOptions};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Suffix the tag file takes in place of the page extension.
pub const TAGFILE_EXTENSION: &str = "tag.xml";

/// Tag file name in multi-page mode, inside the output directory.
pub const TAGFILE_NAME: &str = "reference.tag.xml";

/// `[generate]` section in refgen.toml.
///
/// # Example
/// ```toml
/// [generate]
/// output = "docs/reference"  # directory (multipage) or file (single page)
/// multipage = false
/// format = "html"
/// concurrency = 8            # 0 = one worker per core
/// tagfile = true
/// addons = "addons"          # layout overrides: addons/<format>/single-header.<ext>
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct GenerateConfig {
    /// Output directory (multipage) or output file (single page).
    #[serde(default = "defaults::generate::output")]
    #[educe(Default = defaults::generate::output())]
    pub output: PathBuf,

    /// One file per entity instead of a single document.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub multipage: bool,

    #[serde(default)]
    pub format: Format,

    /// Number of workers (and renderers).
    #[serde(default = "defaults::generate::concurrency")]
    #[educe(Default = defaults::generate::concurrency())]
    pub concurrency: usize,

    /// Write the Doxygen tag file.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub tagfile: bool,

    /// Directory with layout overrides.
    #[serde(default)]
    pub addons: Option<PathBuf>,
}

impl GenerateConfig {
    /// Options handed to every renderer.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            format: self.format,
            multipage: self.multipage,
            addons: self.addons.clone(),
        }
    }

    /// The single-page output file: `output`, given the format's extension if
    /// it has none.
    pub fn single_page_file(&self) -> PathBuf {
        match self.output.extension() {
            Some(_) => self.output.clone(),
            None => self.output.with_extension(self.format.extension()),
        }
    }

    /// Where the tag file goes for the configured mode.
    pub fn tagfile_path(&self) -> PathBuf {
        if self.multipage {
            self.output.join(TAGFILE_NAME)
        } else {
            self.single_page_file().with_extension(TAGFILE_EXTENSION)
        }
    }

    /// File name of the single-page output, as referenced from the tag file.
    pub fn single_page_name(&self) -> String {
        let file = self.single_page_file();
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned())
    }

    /// Output root used in log messages.
    pub fn output_path(&self) -> PathBuf {
        if self.multipage {
            self.output.clone()
        } else {
            self.single_page_file()
        }
    }
}
