//! Session state manager — owns the Directional Points state, writes it
//! through to the store after every change and projects it onto the desktop.
//!
//! Startup order (see [`SessionManager::start`]):
//!   1. load_state              tolerant read of the persisted triple
//!   2. apply_daily_login_bonus at most once per calendar day
//!   3. update_ui               first render

use anyhow::Result;

use super::clock::Clock;
use super::notify::Notifier;
use super::points::PointsState;
use super::storage::KeyValueStore;
use crate::config::{is_plus_only_theme, DAILY_BONUS, PLUS_COST};
use crate::desktop::{
    Desktop, ACTIVE_CLASS, BODY_PLUS_ACTIVE, PLUS_ENABLED, PLUS_REQUIREMENT_TEXT, PLUS_STATUS,
    POINTS_DISPLAY, UNLOCK_PLUS_BTN,
};

// ── Outcomes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    AlreadyUnlocked,
    Insufficient { needed: u64 },
    Unlocked,
}

// ── Messages ──────────────────────────────────────────────────────────────────

pub const STATUS_PLUS: &str = "Directional+ Active";
pub const STATUS_FREE: &str = "Free Tier";
pub const REQUIREMENT_MET: &str = "You already unlocked Directional+.";
pub const MSG_ALREADY_UNLOCKED: &str = "Directional+ is already unlocked!";
pub const MSG_UNLOCKED: &str = "Directional+ unlocked! Enjoy your premium visuals and perks.";
pub const MSG_THEME_LOCKED: &str =
    "This theme is for Directional+ users. Earn and unlock Directional+ to use it.";

pub fn daily_bonus_message() -> String {
    format!("Daily login bonus: +{DAILY_BONUS} Directional Points!")
}

pub fn earned_message(amount: u64) -> String {
    format!("You earned +{amount} points!")
}

pub fn insufficient_message(needed: u64) -> String {
    format!("You need {needed} more points to unlock Directional+. Keep using Norther OS!")
}

pub fn requirement_text(balance: u64) -> String {
    format!("Cost: {PLUS_COST} points. You currently have {balance}.")
}

// ── Manager ───────────────────────────────────────────────────────────────────

pub struct SessionManager<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
    state: PointsState,
    desktop: Desktop,
}

impl<S: KeyValueStore, N: Notifier, C: Clock> SessionManager<S, N, C> {
    /// A manager with default state. Nothing is read until `load_state`.
    pub fn new(store: S, notifier: N, clock: C, desktop: Desktop) -> Self {
        Self {
            store,
            notifier,
            clock,
            state: PointsState::default(),
            desktop,
        }
    }

    /// Load, apply the daily bonus, then render.
    pub fn start(store: S, notifier: N, clock: C, desktop: Desktop) -> Result<Self> {
        let mut manager = Self::new(store, notifier, clock, desktop);
        manager.load_state();
        manager.apply_daily_login_bonus()?;
        manager.update_ui();
        Ok(manager)
    }

    pub fn state(&self) -> &PointsState {
        &self.state
    }

    pub fn desktop(&self) -> &Desktop {
        &self.desktop
    }

    pub fn desktop_mut(&mut self) -> &mut Desktop {
        &mut self.desktop
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    pub fn load_state(&mut self) {
        self.state = PointsState::from_store(&self.store);
        tracing::debug!(
            balance = self.state.balance,
            plus = self.state.plus,
            last_daily = ?self.state.last_daily,
            "loaded session state"
        );
    }

    pub fn save_state(&mut self) -> Result<()> {
        self.state.save(&mut self.store)
    }

    // ── Points ────────────────────────────────────────────────────────────────

    /// Grant `DAILY_BONUS` unless one was already granted today. Returns
    /// whether the bonus was granted.
    pub fn apply_daily_login_bonus(&mut self) -> Result<bool> {
        let now = self.clock.now();
        let today = self.clock.today();
        let last_day = self.state.last_daily.as_ref().map(|at| self.clock.day_key(at));

        if last_day == Some(today) {
            tracing::debug!(%today, "daily bonus already granted");
            return Ok(false);
        }

        self.state.balance = self.state.balance.saturating_add(DAILY_BONUS);
        self.state.last_daily = Some(now);
        self.save_state()?;
        self.update_ui();
        tracing::info!(%today, balance = self.state.balance, "granted daily login bonus");
        self.notifier.notify(&daily_bonus_message());
        Ok(true)
    }

    /// Add `amount` to the balance. Zero is ignored.
    pub fn add_points(&mut self, amount: u64, silent: bool) -> Result<()> {
        if amount == 0 {
            tracing::debug!("ignoring zero-point award");
            return Ok(());
        }
        self.state.balance = self.state.balance.saturating_add(amount);
        self.save_state()?;
        self.update_ui();
        tracing::debug!(amount, balance = self.state.balance, "points added");
        if !silent {
            self.notifier.notify(&earned_message(amount));
        }
        Ok(())
    }

    pub fn dev_earn_points(&mut self, amount: u64) -> Result<()> {
        self.add_points(amount, false)
    }

    // ── Directional+ ──────────────────────────────────────────────────────────

    pub fn attempt_unlock_plus(&mut self) -> Result<UnlockOutcome> {
        if self.state.plus {
            self.notifier.notify(MSG_ALREADY_UNLOCKED);
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        if self.state.balance < PLUS_COST {
            let needed = PLUS_COST - self.state.balance;
            self.notifier.notify(&insufficient_message(needed));
            return Ok(UnlockOutcome::Insufficient { needed });
        }

        self.state.plus = true;
        self.save_state()?;
        self.update_ui();
        tracing::info!(balance = self.state.balance, "Directional+ unlocked");
        self.notifier.notify(MSG_UNLOCKED);
        Ok(UnlockOutcome::Unlocked)
    }

    // ── Projection ────────────────────────────────────────────────────────────

    pub fn update_ui(&mut self) {
        let PointsState { balance, plus, .. } = self.state;
        let desktop = &mut self.desktop;

        if let Some(el) = desktop.element_mut(POINTS_DISPLAY) {
            el.text = balance.to_string();
        }
        if let Some(el) = desktop.element_mut(PLUS_STATUS) {
            el.text = if plus { STATUS_PLUS } else { STATUS_FREE }.to_string();
        }
        if let Some(el) = desktop.element_mut(PLUS_REQUIREMENT_TEXT) {
            el.text = if plus {
                REQUIREMENT_MET.to_string()
            } else {
                requirement_text(balance)
            };
        }
        if let Some(el) = desktop.element_mut(UNLOCK_PLUS_BTN) {
            el.disabled = plus;
        }

        desktop.root.set_class(BODY_PLUS_ACTIVE, plus);
        desktop.root.set_class(PLUS_ENABLED, plus);
    }

    // ── Windows ───────────────────────────────────────────────────────────────

    pub fn open_window(&mut self, id: &str) {
        match self.desktop.element_mut(id) {
            Some(el) => el.add_class(ACTIVE_CLASS),
            None => tracing::trace!(id, "open_window: no such window"),
        }
    }

    pub fn close_window(&mut self, id: &str) {
        match self.desktop.element_mut(id) {
            Some(el) => el.remove_class(ACTIVE_CLASS),
            None => tracing::trace!(id, "close_window: no such window"),
        }
    }

    pub fn toggle_window(&mut self, id: &str) {
        if self.desktop.is_open(id) {
            self.close_window(id);
        } else {
            self.open_window(id);
        }
    }

    // ── Themes ────────────────────────────────────────────────────────────────

    /// Apply `theme` to the desktop root. Directional+ themes are refused
    /// while locked; anything else is applied as given.
    pub fn set_theme(&mut self, theme: &str) -> bool {
        if is_plus_only_theme(theme) && !self.state.plus {
            self.notifier.notify(MSG_THEME_LOCKED);
            return false;
        }
        self.desktop.root.theme = Some(theme.to_string());
        tracing::debug!(theme, "theme applied");
        true
    }

    pub fn theme(&self) -> Option<&str> {
        self.desktop.root.theme.as_deref()
    }
}
