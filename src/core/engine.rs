use crate::core::report::AuditReport;
use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use tokio::sync::Mutex;

/// What a finished run produced.
#[derive(Debug)]
pub struct AuditRun {
    pub output_path: String,
    pub report: AuditReport,
}

pub struct AuditEngine<P: Pipeline> {
    pipeline: P,
    monitor: Mutex<SystemMonitor>,
}

impl<P: Pipeline> AuditEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: Mutex::new(SystemMonitor::new(monitor_enabled)),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Extract → transform → load.
    pub async fn run(&self) -> Result<AuditRun> {
        tracing::info!("🚀 Starting menu audit");

        let grid = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} rows", grid.len());
        self.monitor.lock().await.mark("extract");

        let report = self.pipeline.transform(grid).await?;
        tracing::info!(
            "🔎 {} screens checked, {} discrepancies",
            report.total_screens,
            report.discrepancy_count()
        );
        self.monitor.lock().await.mark("transform");

        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        let mut monitor = self.monitor.lock().await;
        monitor.mark("load");
        monitor.log_final_stats();

        Ok(AuditRun {
            output_path,
            report,
        })
    }
}
