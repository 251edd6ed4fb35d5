use anyhow::Result;
use swc_common::{sync::Lrc, SourceMap};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

/// Print a module back to source text.
pub fn emit_js(module: &swc_ecma_ast::Module, source_map: Lrc<SourceMap>) -> Result<String> {
    let mut buf = Vec::new();
    {
        let writer = JsWriter::new(source_map.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default()
                .with_target(swc_ecma_ast::EsVersion::latest()),
            cm: source_map,
            comments: None,
            wr: writer,
        };
        module.emit_with(&mut emitter)?;
    }
    Ok(String::from_utf8(buf)?)
}
