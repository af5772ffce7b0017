use crate::core::Pipeline;
use crate::utils::error::{EtlError, Result};
use crate::utils::timing::StageTimer;

/// 一次執行的狀態機；任何非 Done 狀態都可能進入 Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Extracting,
    Transforming,
    Loading,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub extracted: usize,
    pub transformed: usize,
    pub skipped: usize,
    pub loaded: u64,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    timing: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            timing: false,
        }
    }

    pub fn new_with_monitoring(pipeline: P, timing: bool) -> Self {
        Self { pipeline, timing }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let timer = StageTimer::new(self.timing);
        let mut state = RunState::Init;

        state = advance(state, RunState::Extracting);
        tracing::info!("📡 Extracting data...");
        let raw = match self.pipeline.extract().await {
            Ok(records) => records,
            Err(e) => return Err(fail(state, e)),
        };
        let extracted = raw.len();
        tracing::info!("📡 Extracted {} records", extracted);
        timer.mark("extract");

        state = advance(state, RunState::Transforming);
        tracing::info!("🔧 Transforming data...");
        let report = match self.pipeline.transform(raw).await {
            Ok(report) => report,
            Err(e) => return Err(fail(state, e)),
        };
        let transformed = report.roads.len();
        let skipped = report.skipped.len();
        tracing::info!(
            "🔧 Transformed {} records ({} skipped)",
            transformed,
            skipped
        );
        timer.mark("transform");

        state = advance(state, RunState::Loading);
        tracing::info!("💾 Loading data...");
        let loaded = match self.pipeline.load(report).await {
            Ok(count) => count,
            Err(e) => return Err(fail(state, e)),
        };
        tracing::info!("💾 Loaded {} rows", loaded);
        timer.mark("load");

        advance(state, RunState::Done);
        timer.finish();

        Ok(RunSummary {
            extracted,
            transformed,
            skipped,
            loaded,
        })
    }
}

fn advance(from: RunState, to: RunState) -> RunState {
    tracing::debug!("run state {:?} -> {:?}", from, to);
    to
}

fn fail(from: RunState, err: EtlError) -> EtlError {
    tracing::error!("run state {:?} -> {:?}: {}", from, RunState::Failed, err);
    err
}
