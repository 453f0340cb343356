//! # 批量执行器
//!
//! 并行解码一批计算任务。所有任务共享同一个只读注册表，
//! 每个任务各自拥有自己的收集器。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//! - 失败任务收集与汇总
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `codec.rs` 解码

use super::DecodeJob;
use crate::codec::DecodeRequest;
use crate::error::{CodecError, Result};
use crate::models::{CalcType, ResultRecord};
use crate::registry::Registry;
use crate::utils::progress;

use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use tracing::{info, warn};

/// 单个任务的解码结果
#[derive(Debug, Clone, Serialize)]
pub struct DecodedJob {
    pub name: String,
    pub record: ResultRecord,
}

/// 单个任务处理结果
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Decoded(DecodedJob),
    /// (任务名, 错误信息)
    Failed(String, String),
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub decoded: Vec<DecodedJob>,
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Decoded(job) => self.decoded.push(job),
            JobOutcome::Failed(name, err) => self.failures.push((name, err)),
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.decoded.len() + self.failures.len()
    }
}

/// 解码单个任务
pub fn decode_job(
    job: &DecodeJob,
    registry: &Registry,
    program: &str,
    calctype: Option<CalcType>,
) -> Result<ResultRecord> {
    let stdout = fs::read_to_string(&job.stdout).map_err(|e| CodecError::FileReadError {
        path: job.stdout.display().to_string(),
        source: e,
    })?;

    DecodeRequest::new(program)
        .calctype(calctype)
        .stdout(stdout.as_str())
        .directory(job.directory.as_path())
        .decode(registry)
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器；`jobs == 0` 时使用全部逻辑核
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行解码任务列表，结果顺序与输入一致
    pub fn run(
        &self,
        jobs: &[DecodeJob],
        registry: &Registry,
        program: &str,
        calctype: Option<CalcType>,
    ) -> Result<BatchResult> {
        let pb = progress::create_progress_bar(jobs.len() as u64, "Decoding");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| CodecError::Other(format!("Failed to build thread pool: {}", e)))?;

        let outcomes: Vec<JobOutcome> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let outcome = match decode_job(job, registry, program, calctype) {
                        Ok(record) => JobOutcome::Decoded(DecodedJob {
                            name: job.name.clone(),
                            record,
                        }),
                        Err(e) => {
                            warn!(job = %job.name, error = %e, "Failed to decode job");
                            JobOutcome::Failed(job.name.clone(), e.to_string())
                        }
                    };
                    pb.inc(1);
                    outcome
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut batch_result = BatchResult::default();
        for outcome in outcomes {
            batch_result.merge(outcome);
        }

        info!(
            decoded = batch_result.decoded.len(),
            failed = batch_result.failures.len(),
            threads = self.jobs,
            "Batch decode finished"
        );

        Ok(batch_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_job(root: &Path, name: &str, stdout: &str) -> DecodeJob {
        let directory = root.join(name);
        fs::create_dir_all(&directory).unwrap();
        let path = directory.join("tc.out");
        fs::write(&path, stdout).unwrap();
        DecodeJob {
            name: name.to_string(),
            stdout: path,
            directory,
        }
    }

    #[test]
    fn test_batch_decode() {
        let root = tempfile::tempdir().unwrap();
        let jobs = vec![
            write_job(
                root.path(),
                "a",
                "SINGLE POINT ENERGY CALCULATIONS\nFINAL ENERGY: -1.5 a.u.\n",
            ),
            write_job(root.path(), "b", "SINGLE POINT ENERGY CALCULATIONS\n"),
            write_job(
                root.path(),
                "c",
                "SINGLE POINT ENERGY CALCULATIONS\nFINAL ENERGY: -2.5 a.u.\n",
            ),
        ];

        let registry = Registry::builtin().unwrap();
        let result = BatchRunner::new(2)
            .run(&jobs, &registry, "terachem", None)
            .unwrap();

        assert_eq!(result.total(), 3);
        let names: Vec<&str> = result.decoded.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(result.decoded[1].record.energy(), Some(-2.5));
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, "b");
        assert!(result.failures[0].1.contains("energy"));
    }

    #[test]
    fn test_runner_auto_jobs() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
        assert_eq!(BatchRunner::new(3).jobs(), 3);
    }
}
