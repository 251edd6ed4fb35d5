use anyhow::Result;
use swc_common::{
    comments::SingleThreadedComments, errors::Handler, sync::Lrc, FileName, SourceMap,
};
use swc_ecma_ast::EsVersion;
use swc_ecma_parser::{EsSyntax, Syntax};

/// Result of parsing one generated module.
pub struct ParsedModule {
    pub module: swc_ecma_ast::Module,
    pub comments: SingleThreadedComments,
    pub source_map: Lrc<SourceMap>,
}

/// Parse a generated JavaScript module.
///
/// The input is plain ES (compiler output), never TypeScript or JSX.
pub fn parse_js(source: &str, filename: &str) -> Result<ParsedModule> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let comments = SingleThreadedComments::default();

    let handler =
        Handler::with_emitter_writer(Box::new(std::io::stderr()), Some(source_map.clone()));

    let module = swc_ecma_parser::parse_file_as_module(
        &source_file,
        Syntax::Es(EsSyntax::default()),
        EsVersion::latest(),
        Some(&comments),
        &mut vec![],
    )
    .map_err(|e| {
        e.into_diagnostic(&handler).emit();
        anyhow::anyhow!("failed to parse {filename}")
    })?;

    Ok(ParsedModule {
        module,
        comments,
        source_map,
    })
}
