//! # decode 命令实现
//!
//! 读取 stdout 与输出目录，解码为 JSON 结果。
//!
//! ## 依赖关系
//! - 使用 `cli/decode.rs` 定义的参数
//! - 使用 `qccodec::codec`, `qccodec::registry`

use crate::cli::decode::DecodeArgs;
use qccodec::error::{CodecError, Result};
use qccodec::utils::output;
use qccodec::{DecodeRequest, ProgramInput, Registry};

use serde_json::json;
use std::fs;

/// 执行 decode 命令
pub fn execute(args: DecodeArgs) -> Result<()> {
    let registry = Registry::builtin()?;

    let stdout = args
        .stdout
        .as_ref()
        .map(|path| {
            fs::read_to_string(path).map_err(|e| CodecError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })
        })
        .transpose()?;

    let input = args
        .input
        .as_deref()
        .map(ProgramInput::from_json_file)
        .transpose()?;

    let request = DecodeRequest::new(&args.program)
        .calctype(args.calctype)
        .stdout(stdout.as_deref())
        .directory(args.dir.as_deref())
        .input(input.as_ref());

    let document = if args.raw {
        let (calctype, data) = request.collect(&registry)?;
        json!({ "calctype": calctype, "data": data })
    } else {
        serde_json::to_value(request.decode(&registry)?)?
    };

    let rendered = serde_json::to_string_pretty(&document)?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered + "\n").map_err(|e| CodecError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
            output::print_success(&format!("Result written to '{}'", path.display()));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
