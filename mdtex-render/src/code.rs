//! Code block language mapping for `listings`
//!
//! `listings` only knows a fixed set of language names and fails the LaTeX
//! run on anything else. Common ecosystem tags are folded onto the closest
//! language it does support; tags without an alias pass through.

/// Listings language for a normalized (trimmed, lowercase) tag.
pub fn alias_target(normalized: &str) -> Option<&'static str> {
    let target = match normalized {
        "javascript" | "js" | "typescript" | "ts" | "jsx" | "tsx" | "kotlin" | "dart"
        | "scala" => "Java",
        "vue" | "svelte" => "HTML",
        "php" => "PHP",
        "ruby" => "Ruby",
        "go" | "rust" | "swift" => "C",
        "clojure" => "Lisp",
        "elixir" => "Erlang",
        "haskell" => "Haskell",
        "ocaml" | "fsharp" => "ML",
        "powershell" | "dockerfile" => "bash",
        "yaml" | "yml" | "toml" | "json" => "XML",
        "markdown" | "md" | "tex" | "latex" => "TeX",
        _ => return None,
    };
    Some(target)
}

/// Map a code block info string to the language passed to `listings`.
///
/// Returns `None` for a missing or blank tag, which selects the verbatim
/// template instead.
pub fn listings_language(info: Option<&str>) -> Option<&str> {
    let tag = info.map(str::trim).filter(|tag| !tag.is_empty())?;
    Some(alias_target(&tag.to_lowercase()).unwrap_or(tag))
}
