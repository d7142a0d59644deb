use std::io;
use std::thread::{self, JoinHandle};

/// Runs a flow on its own execution context.
pub trait Scheduler {
    fn spawn<F>(&self, name: &str, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static;
}

/// One named OS thread per flow.
pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn<F>(&self, name: &str, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new().name(name.to_string()).spawn(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_thread_scheduler_spawn() {
        let scheduler = ThreadScheduler::new();
        let flag = Arc::new(Mutex::new(None));
        let flag_clone = flag.clone();

        let handle = scheduler
            .spawn("midi-test", move || {
                let mut flag = flag_clone.lock().unwrap();
                *flag = thread::current().name().map(str::to_string);
            })
            .unwrap();

        handle.join().unwrap();
        assert_eq!(flag.lock().unwrap().as_deref(), Some("midi-test"));
    }
}
