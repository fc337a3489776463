use async_trait::async_trait;

#[async_trait]
pub trait ScheduledJob: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    ///
    /// Executed at every firing of the schedule.
    /// May be dropped at any await point when runner is closed.
    ///
    async fn run(&self) -> anyhow::Result<()>;
}
