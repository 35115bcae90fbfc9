//! Asset minification for JS and CSS.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Both return the
//! parser's diagnostic as the error so tasks can report it verbatim.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use parcel_sourcemap::SourceMap;

use super::media::group_media_queries;

/// Minify and mangle JavaScript source code.
///
/// Parsed as a classic script so concatenated files keep sharing globals.
pub fn minify_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<_> = ret.errors.iter().map(ToString::to_string).collect();
        return Err(messages.join("\n"));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// CSS post-processing settings.
#[derive(Debug, Clone, Default)]
pub struct CssOptions {
    /// Source name recorded in the map.
    pub filename: String,
    /// Browsers to add vendor prefixes for.
    pub browsers: Option<Browsers>,
    pub group_media: bool,
    pub source_map: bool,
}

impl CssOptions {
    /// Resolve browserslist queries.
    pub fn with_browsers<S: AsRef<str>>(mut self, queries: &[S]) -> Result<Self, String> {
        self.browsers = Browsers::from_browserslist(queries.iter().map(AsRef::as_ref))
            .map_err(|e| e.to_string())?;
        Ok(self)
    }
}

/// Minified stylesheet plus its optional source map JSON.
#[derive(Debug, Clone)]
pub struct MinifiedCss {
    pub code: String,
    pub map: Option<String>,
}

/// Prefix, group media queries and minify CSS.
///
/// Every comment is dropped, license comments included.
pub fn minify_css(source: &str, options: &CssOptions) -> Result<MinifiedCss, String> {
    let targets = Targets {
        browsers: options.browsers,
        ..Targets::default()
    };

    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: options.filename.clone(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    stylesheet.license_comments.clear();
    if options.group_media {
        group_media_queries(&mut stylesheet);
    }

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let mut source_map = if options.source_map {
        let mut sm = SourceMap::new("/");
        sm.add_source(&options.filename);
        sm.set_source_content(0, source).map_err(|e| e.to_string())?;
        Some(sm)
    } else {
        None
    };

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: source_map.as_mut(),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map = match source_map.as_mut() {
        Some(sm) => Some(sm.to_json(None).map_err(|e| e.to_string())?),
        None => None,
    };

    Ok(MinifiedCss {
        code: result.code,
        map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_js_mangles_locals() {
        let src = "function add(first, second) {\n  // sum\n  return first + second;\n}\nwindow.add = add;";
        let out = minify_js(src).unwrap();
        assert!(!out.contains("first"));
        assert!(!out.contains("// sum"));
        assert!(out.len() < src.len());
    }

    #[test]
    fn test_minify_js_syntax_error() {
        let err = minify_js("function (").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_minify_js_deterministic() {
        let src = "var greeting = 'hi'; function say(name) { return greeting + name; }";
        assert_eq!(minify_js(src).unwrap(), minify_js(src).unwrap());
    }

    #[test]
    fn test_minify_css_strips_all_comments() {
        let src = "/*! license */\n/* note */\n.a {\n  color: red;\n}\n";
        let out = minify_css(src, &CssOptions::default()).unwrap();
        assert_eq!(out.code, ".a{color:red}");
        assert!(out.map.is_none());
    }

    #[test]
    fn test_minify_css_prefixes() {
        let options = CssOptions::default()
            .with_browsers(&["last 10 versions"])
            .unwrap();
        let out = minify_css(".a { user-select: none }", &options).unwrap();
        assert!(out.code.contains("-webkit-user-select"));
    }

    #[test]
    fn test_minify_css_source_map() {
        let options = CssOptions {
            filename: "app.css".into(),
            source_map: true,
            ..CssOptions::default()
        };
        let out = minify_css(".a { color: red }\n.b { color: blue }", &options).unwrap();
        let map: serde_json::Value = serde_json::from_str(out.map.as_deref().unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        assert!(map["sources"][0].as_str().unwrap().ends_with("app.css"));
        assert!(!out.code.contains("sourceMappingURL"));
    }

    #[test]
    fn test_invalid_browserslist() {
        assert!(CssOptions::default().with_browsers(&["not a real query ???"]).is_err());
    }
}
