//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Analyses run as background tasks so the menus stay usable; their results
//! are reported as notices before the next prompt.

use crate::adapters::ui::views::{
    REGISTRATION_CITIES, render_analysis, render_dashboard, render_device_line, render_rules,
};
use crate::domain::{DeviceCategory, DeviceStatus, DomainError, NewDevice};
use crate::ports::InputPort;
use crate::usecases::app_controller::current_year;
use crate::usecases::{AnalysisOutcome, AppController, ChatRole, ChatSession, Session, Tab};
use async_trait::async_trait;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Select, Text};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// Number of purchase years offered by the add-device form (current year first).
const PURCHASE_YEAR_CHOICES: i32 = 15;

/// Applies the green theme to all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("♻").with_fg(Color::LightGreen))
        .with_highlighted_option_prefix(Styled::new("➜").with_fg(Color::LightGreen))
        .with_answer(StyleSheet::new().with_fg(Color::LightGreen));
    inquire::set_global_render_config(config);
}

/// Esc / Ctrl-C become `None`; anything else is a UI error.
fn answered<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

enum MenuChoice {
    Open(Tab),
    SignOut,
    Quit,
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    controller: Arc<AppController>,
    chat: Mutex<ChatSession>,
    notices_tx: mpsc::UnboundedSender<String>,
    notices_rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl TuiInputPort {
    pub fn new(controller: Arc<AppController>, chat: ChatSession) -> Self {
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            chat: Mutex::new(chat),
            notices_tx,
            notices_rx: Mutex::new(notices_rx),
        }
    }

    async fn flush_notices(&self) {
        let mut rx = self.notices_rx.lock().await;
        while let Ok(notice) = rx.try_recv() {
            println!("{}", notice.yellow());
        }
    }

    /// Shows and dismisses the analysis in focus, if any.
    async fn show_focused_analysis(&self) {
        let Some(id) = self.controller.viewing_analysis().await else {
            return;
        };
        if let Some(device) = self.controller.device(&id).await {
            if let Some(analysis) = &device.analysis {
                println!("\n{}", render_analysis(&device, analysis));
            }
        }
        self.controller.close_analysis().await;
    }

    /// Returns false when the user backs out of registration.
    async fn registration(&self) -> Result<bool, DomainError> {
        println!("{}", "Join the circular economy".green().bold());
        loop {
            let Some(name) = answered(Text::new("Your name:").prompt())? else {
                return Ok(false);
            };
            let Some(city) = answered(
                Select::new("Your city:", REGISTRATION_CITIES.to_vec()).prompt(),
            )?
            else {
                return Ok(false);
            };
            match self.controller.register(&name, city).await {
                Ok(user) => {
                    println!("{}", format!("Welcome, {}!", user.name).green());
                    return Ok(true);
                }
                Err(DomainError::Validation(msg)) => println!("{}", msg.red()),
                Err(e) => return Err(e),
            }
        }
    }

    async fn main_menu(&self) -> Result<MenuChoice, DomainError> {
        let user = self.controller.user().await;
        let active = self.controller.active_tab().await;
        let mut options: Vec<String> = Tab::ALL.iter().map(|t| t.label().to_string()).collect();
        options.push("Sign out".to_string());
        options.push("Quit".to_string());
        let cursor = Tab::ALL.iter().position(|t| *t == active).unwrap_or(0);

        let title = format!("{} · LIVE IMPACT: {} PTS", user.name, user.stats.score);
        let picked = answered(
            Select::new(&title, options)
                .with_starting_cursor(cursor)
                .raw_prompt(),
        )?;
        Ok(match picked.map(|o| o.index) {
            Some(i) if i < Tab::ALL.len() => MenuChoice::Open(Tab::ALL[i]),
            Some(i) if i == Tab::ALL.len() => MenuChoice::SignOut,
            _ => MenuChoice::Quit,
        })
    }

    async fn dashboard(&self) {
        let user = self.controller.user().await;
        let summary = self.controller.impact_summary().await;
        println!("\n{}", render_dashboard(&user, &summary));
    }

    async fn devices_screen(&self) -> Result<(), DomainError> {
        loop {
            self.flush_notices().await;
            self.show_focused_analysis().await;

            let devices = self.controller.devices().await;
            let mut options = Vec::with_capacity(devices.len() + 2);
            for device in &devices {
                let analyzing = self.controller.is_analyzing(&device.id).await;
                options.push(render_device_line(device, analyzing));
            }
            options.push("+ Register New Device".to_string());
            options.push("< Back".to_string());

            let Some(picked) = answered(Select::new("Your Ecosystem", options).raw_prompt())?
            else {
                return Ok(());
            };
            match picked.index {
                i if i < devices.len() => self.open_device(&devices[i].id).await?,
                i if i == devices.len() => self.add_device_form().await?,
                _ => return Ok(()),
            }
        }
    }

    async fn open_device(&self, device_id: &str) -> Result<(), DomainError> {
        let Some(device) = self.controller.device(device_id).await else {
            return Ok(());
        };
        if device.is_analyzed() {
            // Viewing an existing result is immediate.
            self.controller.trigger_analysis(device_id).await?;
            return Ok(());
        }
        if self.controller.is_analyzing(device_id).await {
            println!("{}", "Still consulting AI for this device...".yellow());
            return Ok(());
        }

        println!("{}", format!("Consulting AI about {}...", device.name).cyan());
        let controller = Arc::clone(&self.controller);
        let notices = self.notices_tx.clone();
        let id = device_id.to_string();
        let name = device.name.clone();
        tokio::spawn(async move {
            let notice = match controller.trigger_analysis(&id).await {
                Ok(AnalysisOutcome::Completed(a)) => Some(format!(
                    "Analysis ready for {}: {} ({}/100)",
                    name, a.recommendation, a.sustainability_score
                )),
                Ok(AnalysisOutcome::Viewing(_)) => None,
                Ok(AnalysisOutcome::Suppressed) => {
                    Some(format!("{} is already being analyzed", name))
                }
                Err(e) => Some(e.to_string()),
            };
            if let Some(notice) = notice {
                let _ = notices.send(notice);
            }
        });
        Ok(())
    }

    async fn add_device_form(&self) -> Result<(), DomainError> {
        let Some(brand) = answered(Text::new("Brand:").prompt())? else {
            return Ok(());
        };
        let Some(model) = answered(Text::new("Model:").prompt())? else {
            return Ok(());
        };
        let categories = DeviceCategory::KNOWN;
        let labels: Vec<&str> = categories.iter().map(|c| c.label()).collect();
        let Some(category) = answered(Select::new("Category:", labels).raw_prompt())? else {
            return Ok(());
        };
        let this_year = current_year();
        let years: Vec<i32> = (0..PURCHASE_YEAR_CHOICES).map(|i| this_year - i).collect();
        let Some(year) = answered(Select::new("Purchase Year:", years).prompt())? else {
            return Ok(());
        };
        let Some(status) = answered(
            Select::new("Current State:", DeviceStatus::ALL.to_vec()).prompt(),
        )?
        else {
            return Ok(());
        };

        let device = self
            .controller
            .add_device(NewDevice {
                brand: Some(brand),
                model: Some(model),
                category: Some(categories[category.index].clone()),
                purchase_year: Some(year),
                status: Some(status),
            })
            .await?;
        println!("{}", format!("Added {}", device.name).green());
        Ok(())
    }

    async fn consultant(&self) -> Result<(), DomainError> {
        let mut chat = self.chat.lock().await;
        for message in chat.transcript() {
            print_chat_message(message.role, &message.text);
        }
        loop {
            let Some(input) = answered(
                Text::new("You:")
                    .with_help_message("/clear resets the conversation, empty line goes back")
                    .prompt(),
            )?
            else {
                return Ok(());
            };
            match input.trim() {
                "" => return Ok(()),
                "/clear" => {
                    chat.clear();
                    for message in chat.transcript() {
                        print_chat_message(message.role, &message.text);
                    }
                }
                query => {
                    let spinner = typing_spinner();
                    let reply = chat.send(query).await;
                    spinner.finish_and_clear();
                    if let Some(reply) = reply {
                        print_chat_message(ChatRole::Bot, &reply);
                    }
                }
            }
        }
    }
}

fn typing_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("ReVibe is typing...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_chat_message(role: ChatRole, text: &str) {
    match role {
        ChatRole::User => println!("{} {}", "you  >".bold(), text),
        ChatRole::Bot => println!("{} {}", "revibe>".green().bold(), text),
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            self.flush_notices().await;

            if self.controller.session().await == Session::Anonymous {
                if !self.registration().await? {
                    return Ok(());
                }
                continue;
            }

            self.show_focused_analysis().await;

            match self.main_menu().await? {
                MenuChoice::Open(tab) => {
                    debug!(tab = tab.label(), "navigate");
                    self.controller.set_active_tab(tab).await;
                    match tab {
                        Tab::Dashboard => self.dashboard().await,
                        Tab::Devices => self.devices_screen().await?,
                        Tab::Consultant => self.consultant().await?,
                        Tab::Rules => println!("\n{}", render_rules()),
                    }
                }
                MenuChoice::SignOut => self.controller.sign_out().await,
                MenuChoice::Quit => return Ok(()),
            }
        }
    }
}
