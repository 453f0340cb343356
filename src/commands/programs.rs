//! # programs 命令实现
//!
//! 以表格列出已注册程序；指定程序时列出其全部解析单元。
//!
//! ## 依赖关系
//! - 使用 `cli/programs.rs` 定义的参数
//! - 使用 `qccodec::registry`, `qccodec::encoders`

use crate::cli::programs::ProgramsArgs;
use qccodec::error::Result;
use qccodec::utils::output;
use qccodec::{EncoderRegistry, Registry};

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct ProgramRow {
    #[tabled(rename = "Program")]
    program: String,
    #[tabled(rename = "Classifier")]
    classifier: String,
    #[tabled(rename = "Directory files")]
    files: String,
    #[tabled(rename = "Parsers")]
    parsers: usize,
    #[tabled(rename = "Encoder")]
    encoder: String,
}

#[derive(Debug, Clone, Tabled)]
struct UnitRow {
    #[tabled(rename = "Parser")]
    name: String,
    #[tabled(rename = "File")]
    file_kind: String,
    #[tabled(rename = "Calctypes")]
    calctypes: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Required")]
    required: String,
}

fn yes_no(flag: bool) -> String {
    let word = if flag { "yes" } else { "no" };
    word.to_string()
}

/// 执行 programs 命令
pub fn execute(args: ProgramsArgs) -> Result<()> {
    let registry = Registry::builtin()?;
    let encoders = EncoderRegistry::builtin();

    match args.program {
        Some(program) => {
            let rows = unit_rows(&registry, &program)?;
            output::print_header(&format!("Parsers registered for {}", program));
            println!("{}", Table::new(rows));
        }
        None => {
            let rows = program_rows(&registry, &encoders)?;
            output::print_header("Supported Programs");
            println!("{}", Table::new(rows));
        }
    }

    Ok(())
}

fn program_rows(registry: &Registry, encoders: &EncoderRegistry) -> Result<Vec<ProgramRow>> {
    registry
        .supported_programs()
        .into_iter()
        .map(|program| {
            let files = registry
                .files(program)?
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ");

            Ok(ProgramRow {
                program: program.to_string(),
                classifier: yes_no(registry.has_classifier(program)?),
                files: if files.is_empty() { "-".to_string() } else { files },
                parsers: registry.parsers(program)?.len(),
                encoder: yes_no(encoders.get(program).is_some()),
            })
        })
        .collect()
}

fn unit_rows(registry: &Registry, program: &str) -> Result<Vec<UnitRow>> {
    Ok(registry
        .parsers(program)?
        .iter()
        .map(|spec| UnitRow {
            name: spec.name.to_string(),
            file_kind: spec.file_kind.to_string(),
            calctypes: spec.applicability.to_string(),
            target: spec.output.to_string(),
            required: yes_no(spec.required),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_rows() {
        let registry = Registry::builtin().unwrap();
        let rows = program_rows(&registry, &EncoderRegistry::builtin()).unwrap();

        let terachem = rows.iter().find(|r| r.program == "terachem").unwrap();
        assert_eq!(terachem.classifier, "yes");
        assert_eq!(terachem.files, "tc.in");
        assert_eq!(terachem.encoder, "yes");

        let crest = rows.iter().find(|r| r.program == "crest").unwrap();
        assert_eq!(crest.classifier, "no");
        assert!(crest.parsers > 0);
    }

    #[test]
    fn test_unit_rows() {
        let registry = Registry::builtin().unwrap();
        let rows = unit_rows(&registry, "terachem").unwrap();
        let energy = rows.iter().find(|r| r.name == "parse_energy").unwrap();
        assert_eq!(energy.target, "energy");
        assert_eq!(energy.required, "yes");

        assert!(unit_rows(&registry, "orca").is_err());
    }
}
