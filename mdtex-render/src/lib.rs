//! Template driven Markdown to LaTeX rendering
//!
//!     This crate turns a parsed document (a tree of typed tokens, as produced by a markdown
//!     tokenizer) into LaTeX source. What each construct looks like in the output is not
//!     hard coded: every construct renders through a swappable template, and the finished
//!     body is inserted into a document template that owns the preamble.
//!
//!     This is a pure lib: the only processes it ever starts are the optional LaTeX engine
//!     (and bibtex) in [`compile`] and the image tools in [`images`], and nothing here prints
//!     or reads the environment besides those tool lookups. The `mdtex` binary in mdtex-cli
//!     is the shell around it.
//!
//! Architecture
//!
//!     source ─ Tokenizer ─▶ [Token] ─ LatexRenderer ─▶ body ─ DocumentTemplate ─▶ .tex
//!                                          │
//!                   TemplateSet ◀─ resolve ─┘ (construct configs, overrides)
//!
//!     The file structure :
//!     .
//!     ├── token.rs                # Token tree (mistune shaped, JSON deserializable)
//!     ├── tokenizer               # Tokenizer trait, comrak markdown and JSON tokenizers
//!     ├── renderer.rs             # Tree walk and construct renderers
//!     ├── template                # Typed per-construct templates and the document wrapper
//!     ├── resolve.rs              # Built-in / file configs and templates, merge and fallback
//!     ├── escape.rs               # LaTeX metacharacter escaping
//!     ├── heading.rs              # Heading depth to sectioning command
//!     ├── code.rs                 # Code block language to listings language
//!     ├── image.rs                # Image path rewrites, format notes, labels
//!     ├── table.rs                # Table reassembly
//!     ├── convert.rs              # High level conversion API
//!     ├── batch.rs                # Parallel conversion of many files
//!     ├── compile.rs              # PDF through an external LaTeX engine (native-export)
//!     ├── images.rs               # BMP/TIFF/GIF/WebP/SVG to PNG via external tools (native-export)
//!     └── process.rs              # Bounded external process runs (native-export)
//!
//! Failure policy
//!
//!     Rendering never fails. Unknown tokens render as nothing, missing templates fall back
//!     to built-ins, deep headings clamp, and unreadable config or template files are logged
//!     and replaced by defaults. Errors ([`ConvertError`]) only come from the edges: reading
//!     an input, writing an output, tokenizing, compiling.
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common         # body-only options shared by the suites
//!     ├── render         # end to end markdown to LaTeX
//!     ├── resolve        # config merge and fallback
//!     ├── batch
//!     ├── compile        # stub engine scripts (unix, native-export)
//!     └── images         # stub converter scripts (unix, native-export)

pub mod batch;
pub mod code;
#[cfg(feature = "native-export")]
pub mod compile;
pub mod convert;
pub mod error;
pub mod escape;
pub mod heading;
pub mod image;
#[cfg(feature = "native-export")]
pub mod images;
#[cfg(feature = "native-export")]
mod process;
pub mod renderer;
pub mod resolve;
pub mod table;
pub mod template;
pub mod token;
pub mod tokenizer;

pub use batch::{convert_batch, BatchOutcome};
#[cfg(feature = "native-export")]
pub use compile::{CompileReport, LatexCompiler, LatexEngine};
pub use convert::{convert_file, convert_str, convert_tokens, convert_with, ConvertOptions};
pub use error::{ConvertError, TemplateError};
pub use escape::escape_latex;
pub use heading::HeadingLevelTable;
pub use image::ImagePathPolicy;
#[cfg(feature = "native-export")]
pub use images::{ImageConverter, ImageOutcome, ImageTool};
pub use renderer::{LatexRenderer, RenderOptions};
pub use resolve::{
    builtin_configs, builtin_templates, resolve_config, resolve_template, ConfigMap, ConfigSource,
    TemplateSource,
};
pub use template::{Construct, DocumentTemplate, TemplateSet};
pub use token::{Token, TokenKind};
pub use tokenizer::{ComrakTokenizer, JsonTokenizer, Tokenizer, TokenizerRegistry};
