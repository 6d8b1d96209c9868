// Intent-style command envelope used by the host platform

use serde::{Deserialize, Serialize};
use smodr_core::{MediaCommand, MediaError, Result};
use std::collections::HashMap;

pub const ACTION_PLAY: &str = "com.kevintcoughlin.smodr.app.PLAY";
pub const ACTION_PAUSE: &str = "com.kevintcoughlin.smodr.app.PAUSE";
pub const ACTION_RESUME: &str = "com.kevintcoughlin.smodr.app.RESUME";
pub const ACTION_STOP: &str = "com.kevintcoughlin.smodr.app.STOP";
pub const ACTION_FORWARD: &str = "com.kevintcoughlin.smodr.app.FORWARD";
pub const ACTION_REWIND: &str = "com.kevintcoughlin.smodr.app.REWIND";

pub const EXTRA_EPISODE_URL: &str = "intent_episode_url";
pub const EXTRA_EPISODE_TITLE: &str = "intent_episode_title";
pub const EXTRA_EPISODE_DESCRIPTION: &str = "intent_episode_description";

/// A podcast episode as handed over by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// What the platform should do if the service process is killed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    Sticky,
    NotSticky,
    /// Restart and deliver the last intent again
    RedeliverIntent,
}

impl StartMode {
    /// Android `Service.START_*` value
    pub fn code(self) -> i32 {
        match self {
            StartMode::Sticky => 1,
            StartMode::NotSticky => 2,
            StartMode::RedeliverIntent => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub extras: HashMap<String, String>,
}

impl Intent {
    /// Bare control intent such as [`ACTION_PAUSE`]
    pub fn for_action(action: &str) -> Self {
        Self {
            action: Some(action.to_string()),
            extras: HashMap::new(),
        }
    }

    /// PLAY intent carrying the episode's url, title and description
    pub fn for_episode(episode: &Episode) -> Self {
        Self::for_action(ACTION_PLAY)
            .with_extra(EXTRA_EPISODE_URL, &episode.url)
            .with_extra(EXTRA_EPISODE_TITLE, &episode.title)
            .with_extra(EXTRA_EPISODE_DESCRIPTION, &episode.description)
    }

    pub fn with_extra(mut self, key: &str, value: &str) -> Self {
        self.extras.insert(key.to_string(), value.to_string());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| MediaError::UnknownCommand(format!("malformed intent: {}", e)))
    }

    /// Map the action to a command.
    ///
    /// FORWARD and REWIND map to the commands of the same name; the
    /// controller decides which direction each one skips.
    pub fn to_command(&self) -> Result<MediaCommand> {
        let action = self
            .action
            .as_deref()
            .ok_or_else(|| MediaError::UnknownCommand("intent has no action".into()))?;

        match action {
            ACTION_PLAY => {
                let url = self
                    .extra(EXTRA_EPISODE_URL)
                    .ok_or(MediaError::MissingExtra(EXTRA_EPISODE_URL))?;
                Ok(MediaCommand::Play(url.to_string()))
            }
            ACTION_PAUSE => Ok(MediaCommand::Pause),
            ACTION_RESUME => Ok(MediaCommand::Resume),
            ACTION_STOP => Ok(MediaCommand::Stop),
            ACTION_FORWARD => Ok(MediaCommand::Forward),
            ACTION_REWIND => Ok(MediaCommand::Rewind),
            other => Err(MediaError::UnknownCommand(other.to_string())),
        }
    }
}
