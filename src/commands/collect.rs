//! # collect 命令实现
//!
//! 批量解码目录树下的计算，汇总为单个 JSON 文件并按能量排序。
//!
//! ## 功能
//! - 按模式收集 stdout 文件
//! - 并行解码（rayon）
//! - 全部结果写入 JSON
//! - 可选 CSV 能量汇总
//! - 终端打印最低能量的前 N 个任务
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `qccodec::batch`

use crate::cli::collect::CollectArgs;
use qccodec::batch::{BatchRunner, DecodedJob, JobCollector};
use qccodec::error::{CodecError, Result};
use qccodec::utils::output;
use qccodec::Registry;

use std::fs;
use std::path::Path;
use tabled::{Table, Tabled};

/// 1 Hartree 对应的 kcal/mol
const HARTREE_TO_KCALMOL: f64 = 627.5094740631;

/// 排名表格行
#[derive(Debug, Clone, Tabled)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "Type")]
    calctype: String,
    #[tabled(rename = "Energy (Eh)")]
    energy: String,
    #[tabled(rename = "ΔE (kcal/mol)")]
    delta_e: String,
}

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting Calculation Results");

    let registry = Registry::builtin()?;
    if !registry.contains(&args.program) {
        return Err(CodecError::UnknownProgram {
            program: args.program.clone(),
        });
    }

    let jobs = JobCollector::new(args.root.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect()?;

    if jobs.is_empty() {
        output::print_warning(&format!(
            "No files matching '{}' found under '{}'",
            args.pattern,
            args.root.display()
        ));
        return Ok(());
    }

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Decoding {} job(s) with {} thread(s)...",
        jobs.len(),
        runner.jobs()
    ));

    let result = runner.run(&jobs, &registry, &args.program, args.calctype)?;

    for (name, err) in &result.failures {
        output::print_warning(&format!("{}: {}", name, err));
    }

    let rendered = serde_json::to_string_pretty(&result.decoded)?;
    fs::write(&args.output, rendered + "\n").map_err(|e| CodecError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;
    output::print_success(&format!(
        "{} of {} result(s) saved to '{}'",
        result.decoded.len(),
        result.total(),
        args.output.display()
    ));

    let ranked = rank_by_energy(&result.decoded);

    if let Some(csv_path) = &args.csv {
        save_summary_csv(&ranked, csv_path)?;
        output::print_success(&format!("Energy summary saved to '{}'", csv_path.display()));
    }

    if ranked.is_empty() {
        output::print_warning("No decoded result carries an energy");
        return Ok(());
    }

    output::print_header(&format!(
        "Top {} Jobs by Energy",
        args.top_n.min(ranked.len())
    ));
    let table = Table::new(rank_rows(&ranked, args.top_n));
    println!("{}", table);

    output::print_done(&format!("Collected {} job(s)", result.decoded.len()));
    Ok(())
}

/// 按能量升序排列有能量的结果
fn rank_by_energy(decoded: &[DecodedJob]) -> Vec<(&DecodedJob, f64)> {
    let mut ranked: Vec<(&DecodedJob, f64)> = decoded
        .iter()
        .filter_map(|job| job.record.energy().map(|e| (job, e)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

fn rank_rows(ranked: &[(&DecodedJob, f64)], top_n: usize) -> Vec<RankRow> {
    let min_energy = ranked.first().map(|(_, e)| *e).unwrap_or(0.0);

    ranked
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (job, energy))| RankRow {
            rank: i + 1,
            job: job.name.clone(),
            calctype: job.record.variant().to_string(),
            energy: format!("{:.8}", energy),
            delta_e: format!("{:.3}", (energy - min_energy) * HARTREE_TO_KCALMOL),
        })
        .collect()
}

/// 保存能量汇总到 CSV
fn save_summary_csv(ranked: &[(&DecodedJob, f64)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["rank", "job", "energy_hartree", "relative_kcalmol"])?;

    let min_energy = ranked.first().map(|(_, e)| *e).unwrap_or(0.0);
    for (i, (job, energy)) in ranked.iter().enumerate() {
        wtr.write_record(&[
            (i + 1).to_string(),
            job.name.clone(),
            format!("{:.10}", energy),
            format!("{:.6}", (energy - min_energy) * HARTREE_TO_KCALMOL),
        ])?;
    }

    wtr.flush().map_err(|e| CodecError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qccodec::{CalcType, ResultRecord};
    use serde_json::json;

    fn job(name: &str, energy: f64) -> DecodedJob {
        DecodedJob {
            name: name.to_string(),
            record: ResultRecord::build(CalcType::Energy, json!({ "energy": energy })).unwrap(),
        }
    }

    #[test]
    fn test_rank_rows() {
        let decoded = vec![job("b", -1.0), job("a", -1.001), job("c", -0.5)];
        let ranked = rank_by_energy(&decoded);
        let rows = rank_rows(&ranked, 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job, "a");
        assert_eq!(rows[0].delta_e, "0.000");
        assert_eq!(rows[1].job, "b");
        assert_eq!(rows[1].delta_e, "0.628");
    }

    #[test]
    fn test_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let decoded = vec![job("b", -1.0), job("a", -2.0)];

        save_summary_csv(&rank_by_energy(&decoded), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "rank,job,energy_hartree,relative_kcalmol");
        assert!(lines[1].starts_with("1,a,-2.0000000000,0.000000"));
        assert!(lines[2].starts_with("2,b,"));
    }
}
