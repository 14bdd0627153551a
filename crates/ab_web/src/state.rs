use std::sync::Arc;

use ab_pipeline::{BlogJob, Publisher, Scheduler};

pub struct AppState {
    pub job: Arc<BlogJob>,
    pub scheduler: Arc<Scheduler>,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(job: Arc<BlogJob>, scheduler: Arc<Scheduler>) -> Self {
        let publisher = job.publisher().clone();
        Self {
            job,
            scheduler,
            publisher,
        }
    }
}
