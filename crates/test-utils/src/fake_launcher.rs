use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use taskwave::dag::LaunchDirective;
use taskwave::errors::Result;
use taskwave::exec::{LaunchReport, Launcher};

/// A fake launcher that:
/// - records every directive it was handed, in order
/// - reports each one as launched, except ids listed in `fail_on`.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<LaunchDirective>>>,
    fail_on: Vec<String>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a spawn failure for `task_id`.
    pub fn failing_on(mut self, task_id: &str) -> Self {
        self.fail_on.push(task_id.to_string());
        self
    }

    pub fn launched(&self) -> Vec<LaunchDirective> {
        self.launched.lock().unwrap().clone()
    }

    pub fn launched_ids(&self) -> Vec<String> {
        self.launched().into_iter().map(|d| d.task_id).collect()
    }
}

impl Launcher for FakeLauncher {
    fn launch(
        &mut self,
        directives: Vec<LaunchDirective>,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchReport>> + Send + '_>> {
        let launched = self.launched.clone();
        let fail_on = self.fail_on.clone();

        Box::pin(async move {
            let mut report = LaunchReport::default();
            for d in directives {
                if fail_on.contains(&d.task_id) {
                    report.failed.push((d.task_id.clone(), "simulated spawn failure".into()));
                } else {
                    report.launched.push(d.task_id.clone());
                }
                launched.lock().unwrap().push(d);
            }
            Ok(report)
        })
    }
}
