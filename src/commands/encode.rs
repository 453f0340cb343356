//! # encode 命令实现
//!
//! 把 JSON 计算输入渲染为程序原生输入文件，写入目录或打印到 stdout。
//!
//! ## 依赖关系
//! - 使用 `cli/encode.rs` 定义的参数
//! - 使用 `qccodec::encoders`

use crate::cli::encode::EncodeArgs;
use qccodec::error::Result;
use qccodec::utils::output;
use qccodec::{EncoderRegistry, ProgramInput};

/// 执行 encode 命令
pub fn execute(args: EncodeArgs) -> Result<()> {
    let input = ProgramInput::from_json_file(&args.input)?;
    let native = EncoderRegistry::builtin().encode(&args.program, &input)?;

    match &args.out_dir {
        Some(dir) => {
            let written = native.write_to(dir)?;
            for path in &written {
                output::print_info(&format!("Wrote {}", path.display()));
            }
            output::print_success(&format!(
                "{} input file(s) written to '{}'",
                written.len(),
                dir.display()
            ));
        }
        None => {
            for (filename, content) in &native.files {
                println!("{}", output::file_banner(filename));
                print!("{}", content);
                if !content.ends_with('\n') {
                    println!();
                }
            }
        }
    }

    Ok(())
}
