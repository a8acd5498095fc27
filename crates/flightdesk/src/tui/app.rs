//! Form state and event loop

use super::{FormSummary, Slot, ui};
use anyhow::Result;
use crossterm::{
    cursor::SetCursorStyle,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use flight_lookup::{
    ApplyOutcome, Candidate, DisplayMode, LookupChannel, LookupConfig, LookupField, LookupService,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

/// Toast notification state
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

impl Toast {
    pub fn new(message: String, duration: Duration) -> Self {
        Self {
            message,
            expires_at: Instant::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// One lookup field plus the worker that serves it
pub struct FormField {
    pub slot: Slot,
    pub field: LookupField,
    /// Duration of the last applied lookup
    pub last_duration: Option<Duration>,
    channel: LookupChannel,
}

impl FormField {
    fn new(
        slot: Slot,
        config: &LookupConfig,
        service: Arc<dyn LookupService>,
        seed: Option<Candidate>,
        selection_tx: mpsc::Sender<(Slot, Candidate)>,
    ) -> Self {
        let field = LookupField::new(slot.category(), config)
            .with_placeholder(slot.placeholder())
            .with_display_mode(DisplayMode::Selection)
            .with_selected(seed)
            .on_select(move |candidate: &Candidate| {
                let _ = selection_tx.send((slot, candidate.clone()));
            });

        Self {
            slot,
            field,
            last_duration: None,
            channel: LookupChannel::spawn(service),
        }
    }

    /// Fire the debounce if due and hand the request to the worker
    fn tick(&mut self, now: Instant) {
        if let Some(request) = self.field.tick(now) {
            self.channel.send(request);
        }
    }

    /// Apply all replies the worker has produced so far
    fn poll_replies(&mut self) {
        while let Some(reply) = self.channel.try_recv() {
            let duration = reply.duration;
            if self.field.apply_reply(reply) == ApplyOutcome::Applied {
                self.last_duration = Some(duration);
            }
        }
    }

    fn push_char(&mut self, c: char, now: Instant) {
        let mut query = self.field.query().to_string();
        query.push(c);
        self.field.set_query(query, now);
    }

    fn pop_char(&mut self, now: Instant) {
        let mut query = self.field.query().to_string();
        if query.pop().is_some() {
            self.field.set_query(query, now);
        }
    }
}

/// Application state
pub struct App {
    pub fields: Vec<FormField>,
    /// Index into `fields` of the focused field
    pub focus: usize,
    /// Should quit?
    pub should_quit: bool,
    /// Toast notification
    pub toast: Option<Toast>,
    /// Selections reported by the fields' callbacks
    selection_rx: Receiver<(Slot, Candidate)>,
}

impl App {
    pub fn new(config: &LookupConfig, service: Arc<dyn LookupService>, seeds: FormSummary) -> Self {
        let (selection_tx, selection_rx) = mpsc::channel();

        let fields = Slot::ALL
            .iter()
            .map(|&slot| {
                let seed = match slot {
                    Slot::Origin => seeds.origin.clone(),
                    Slot::Destination => seeds.destination.clone(),
                    Slot::Airline => seeds.airline.clone(),
                };
                FormField::new(slot, config, service.clone(), seed, selection_tx.clone())
            })
            .collect();

        Self {
            fields,
            focus: 0,
            should_quit: false,
            toast: None,
            selection_rx,
        }
    }

    pub fn focused(&self) -> &FormField {
        &self.fields[self.focus]
    }

    fn focused_mut(&mut self) -> &mut FormField {
        &mut self.fields[self.focus]
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut LookupField {
        let index = Slot::ALL.iter().position(|s| *s == slot).unwrap_or(0);
        &mut self.fields[index].field
    }

    pub fn summary(&self) -> FormSummary {
        let selected = |i: usize| self.fields[i].field.selected().cloned();
        FormSummary {
            origin: selected(0),
            destination: selected(1),
            airline: selected(2),
        }
    }

    /// Advance debounce timers and collect worker replies (non-blocking)
    fn tick(&mut self, now: Instant) {
        for field in &mut self.fields {
            field.tick(now);
            field.poll_replies();
        }
    }

    /// Turn selection callbacks into toasts
    fn poll_selections(&mut self) {
        while let Ok((slot, candidate)) = self.selection_rx.try_recv() {
            log::info!("{} set to {}", slot.title(), candidate.code);
            self.toast = Some(Toast::new(
                format!("{}: {}", slot.title(), candidate.display_label()),
                Duration::from_secs(2),
            ));
        }
    }

    /// Clear expired toast
    fn update_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    fn focus_next(&mut self) {
        self.focused_mut().field.close();
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn focus_prev(&mut self) {
        self.focused_mut().field.close();
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Exchange origin and destination
    fn swap_airports(&mut self) {
        let origin = self.slot_mut(Slot::Origin).selected().cloned();
        let destination = self.slot_mut(Slot::Destination).selected().cloned();
        self.slot_mut(Slot::Origin).adopt_external(destination);
        self.slot_mut(Slot::Destination).adopt_external(origin);
        self.toast = Some(Toast::new(
            "Swapped origin and destination".to_string(),
            Duration::from_secs(2),
        ));
    }

    fn reset(&mut self) {
        for field in &mut self.fields {
            field.field.reset();
            field.last_duration = None;
        }
        self.toast = Some(Toast::new("Form cleared".to_string(), Duration::from_secs(2)));
    }

    fn select(&mut self) {
        let focused = self.focused_mut();
        if focused.field.select_highlighted() {
            self.focus_next();
        }
    }

    /// Handle input event
    fn handle_event(&mut self, event: Event, now: Instant) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => self.should_quit = true,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => self.should_quit = true,
            (KeyCode::Tab, _) => self.focus_next(),
            (KeyCode::BackTab, _) => self.focus_prev(),
            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::CONTROL) => {
                self.focused_mut().field.move_highlight(-1)
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::CONTROL) => {
                self.focused_mut().field.move_highlight(1)
            }
            (KeyCode::Enter, _) => self.select(),
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => self.swap_airports(),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => self.reset(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.focused_mut().field.set_query(String::new(), now);
            }
            (KeyCode::Backspace, _) => self.focused_mut().pop_char(now),
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                self.focused_mut().push_char(c, now)
            }
            _ => {}
        }
    }

    /// Tear down every field so late replies are ignored
    fn dispose(&mut self) {
        for field in &mut self.fields {
            field.field.dispose();
        }
    }
}

/// Run the form and return the chosen values
pub fn run(
    config: &LookupConfig,
    service: Arc<dyn LookupService>,
    seeds: FormSummary,
) -> Result<FormSummary> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetCursorStyle::BlinkingBar)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, service, seeds);

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        SetCursorStyle::DefaultUserShape
    )?;
    terminal.show_cursor()?;

    app.dispose();
    result.map(|_| app.summary())
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.update_toast();

        app.tick(Instant::now());

        app.poll_selections();

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(16))? {
            let event = event::read()?;
            app.handle_event(event, Instant::now());
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
