//! Recording double for [`ViewerChannel`].

use std::collections::VecDeque;

use canvas3d_protocol::{Command, LaunchError, Response, ViewerChannel, ViewerLaunch};

/// Records every command and answers from a script, `<ok/>` by default.
#[derive(Debug)]
pub(crate) struct RecordingChannel {
    commands: Vec<Command>,
    launches: Vec<ViewerLaunch>,
    stops: usize,
    scripted: VecDeque<Response>,
    fallback: Response,
    launch_failure: Option<LaunchError>,
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            launches: Vec::new(),
            stops: 0,
            scripted: VecDeque::new(),
            fallback: Response::ok(),
            launch_failure: None,
        }
    }
}

impl RecordingChannel {
    /// Queues a response for the next unanswered command.
    pub(crate) fn respond_with(&mut self, response: Response) {
        self.scripted.push_back(response);
    }

    /// Answers every unscripted command with `response`.
    pub(crate) fn answer_all_with(&mut self, response: Response) {
        self.fallback = response;
    }

    /// Makes the next `start` fail.
    pub(crate) fn fail_launch(&mut self, error: LaunchError) {
        self.launch_failure = Some(error);
    }

    pub(crate) fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub(crate) fn names(&self) -> Vec<&str> {
        self.commands.iter().map(Command::name).collect()
    }

    /// Commands named `name`, in send order.
    pub(crate) fn named(&self, name: &str) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|command| command.name() == name)
            .collect()
    }

    /// Forgets recorded commands.
    pub(crate) fn clear(&mut self) {
        self.commands.clear();
    }

    pub(crate) fn launches(&self) -> &[ViewerLaunch] {
        &self.launches
    }

    pub(crate) const fn stops(&self) -> usize {
        self.stops
    }
}

impl ViewerChannel for RecordingChannel {
    fn start(&mut self, launch: &ViewerLaunch) -> Result<(), LaunchError> {
        if let Some(error) = self.launch_failure.take() {
            return Err(error);
        }
        self.launches.push(launch.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn evaluate(&mut self, command: &Command) -> Response {
        self.commands.push(command.clone());
        self.scripted
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
