// File: questdeck-core/src/tasks/rotation.rs
//
// The single background loop that keeps every user's hand current: it
// tops up const-pool chains and re-deals daily cards once per local
// calendar day. Exactly one scheduler runs per process.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use questdeck_common::models::card::PoolKind;
use questdeck_common::models::user::User;
use questdeck_common::traits::repository_traits::{CardRepository, UserRepository};

use crate::engine::sampler::draw_templates;
use crate::Error;

/// Longest pause between ticks after repeated store failures.
const MAX_BACKOFF: Duration = Duration::from_secs(320);

#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Pause between successful ticks.
    pub tick_interval: Duration,
    /// Pause before retrying after an exhausted daily pool.
    pub retry_interval: Duration,
    /// Daily cards dealt to each user per rollover.
    pub daily_hand_size: usize,
    /// Require pairwise-distinct goal tags within a daily hand.
    pub distinct_goals: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(20),
            retry_interval: Duration::from_secs(20),
            daily_hand_size: 3,
            distinct_goals: false,
        }
    }
}

/// What one reconciliation pass accomplished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub const_cards_issued: usize,
    pub users_rolled_over: usize,
}

/// How one reconciliation pass ended.
#[derive(Debug)]
pub enum TickOutcome {
    Completed(TickReport),
    /// The daily pool cannot satisfy the configured hand; nobody's
    /// rollover marker moved, so every due user stays due.
    Exhausted,
    Failed(Error),
}

pub struct RotationScheduler {
    cards: Arc<dyn CardRepository>,
    users: Arc<dyn UserRepository>,
    config: RotationConfig,
}

impl RotationScheduler {
    pub fn new(
        cards: Arc<dyn CardRepository>,
        users: Arc<dyn UserRepository>,
        config: RotationConfig,
    ) -> Self {
        Self { cards, users, config }
    }

    /// Runs one reconciliation pass: const-chain top-up for every user,
    /// then the daily rollover for users whose last deal is a previous
    /// local calendar day.
    pub async fn tick(&self) -> TickOutcome {
        // StdRng keeps the tick future Send so it can run on the spawned
        // scheduler task; ThreadRng cannot cross the awaits here.
        let mut rng = StdRng::from_os_rng();
        self.tick_with_rng(&mut rng, Local::now()).await
    }

    /// Same as [`tick`](Self::tick), with the randomness and clock passed
    /// in so tests can pin both.
    pub async fn tick_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Local>,
    ) -> TickOutcome {
        let users = match self.users.list_all().await {
            Ok(u) => u,
            Err(e) => return TickOutcome::Failed(e),
        };

        let mut report = TickReport::default();

        match self.const_sync(&users).await {
            Ok(issued) => report.const_cards_issued = issued,
            Err(e) => return TickOutcome::Failed(e),
        }

        match self.daily_rollover(rng, &users, now).await {
            Ok(rolled) => report.users_rolled_over = rolled,
            Err(Error::PoolExhausted(_)) => return TickOutcome::Exhausted,
            Err(e) => return TickOutcome::Failed(e),
        }

        TickOutcome::Completed(report)
    }

    /// Issues every const-pool template a user does not already hold.
    /// Purely additive, so running it twice changes nothing.
    async fn const_sync(&self, users: &[User]) -> Result<usize, Error> {
        let templates = self.cards.list_templates_by_pool(PoolKind::Const).await?;
        if templates.is_empty() {
            return Ok(0);
        }

        let mut issued = 0;
        for user in users {
            let held = self
                .cards
                .list_cards_for_owner(&user.username, Some(PoolKind::Const))
                .await?;

            for tpl in &templates {
                if held.iter().any(|c| c.template.template_id == tpl.template_id) {
                    continue;
                }
                self.cards.create_card(&tpl.issue(&user.username)).await?;
                issued += 1;
            }
        }
        Ok(issued)
    }

    /// Re-deals daily hands for users whose last deal happened on an
    /// earlier local calendar day.
    ///
    /// Fails with [`Error::PoolExhausted`] when the daily pool cannot
    /// satisfy the configured hand — the whole phase aborts and no
    /// rollover marker is written, so a later tick re-deals everyone who
    /// was due.
    async fn daily_rollover<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        users: &[User],
        now: DateTime<Local>,
    ) -> Result<usize, Error> {
        let templates = self.cards.list_templates_by_pool(PoolKind::Daily).await?;
        let today = now.date_naive();
        let marker = local_midnight_utc(today, now);

        let mut rolled: Vec<&str> = Vec::new();
        for user in users {
            let last = user.last_daily_update.with_timezone(&Local).date_naive();
            if today <= last {
                continue;
            }

            let hand = draw_templates(
                rng,
                &templates,
                self.config.daily_hand_size,
                self.config.distinct_goals,
            );
            if hand.is_empty() {
                return Err(Error::PoolExhausted(format!(
                    "daily pool of {} templates cannot deal a hand of {}",
                    templates.len(),
                    self.config.daily_hand_size
                )));
            }

            self.cards
                .delete_pending_cards(&user.username, PoolKind::Daily)
                .await?;
            for tpl in &hand {
                self.cards.create_card(&tpl.issue(&user.username)).await?;
            }
            rolled.push(&user.username);
        }

        // markers move only after every due user has been re-dealt
        for username in &rolled {
            self.users.set_last_daily_update(username, marker).await?;
        }
        Ok(rolled.len())
    }

    /// Supervised loop. Store failures back off exponentially and never
    /// take the process down; an exhausted daily pool retries on a fixed
    /// interval. Flipping `shutdown` to `true` exits between ticks.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = self.config.retry_interval;
        loop {
            let pause = match self.tick().await {
                TickOutcome::Completed(report) => {
                    if report.const_cards_issued > 0 || report.users_rolled_over > 0 {
                        info!(
                            "rotation tick: {} const cards issued, {} users rolled over",
                            report.const_cards_issued, report.users_rolled_over
                        );
                    }
                    backoff = self.config.retry_interval;
                    self.config.tick_interval
                }
                TickOutcome::Exhausted => {
                    warn!("daily pool exhausted; retrying in {:?}", self.config.retry_interval);
                    self.config.retry_interval
                }
                TickOutcome::Failed(e) => {
                    error!("rotation tick failed: {:?}; retrying in {:?}", e, backoff);
                    let pause = backoff;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    pause
                }
            };

            tokio::select! {
                _ = sleep(pause) => {}
                changed = shutdown.changed() => {
                    // a dropped sender counts as shutdown too
                    if changed.is_err() || *shutdown.borrow() {
                        info!("rotation scheduler shutting down");
                        return;
                    }
                }
            }
        }
    }
}

/// The Utc instant of local midnight on `date`; this is the value stored
/// as a user's rollover marker.
fn local_midnight_utc(date: NaiveDate, fallback: DateTime<Local>) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or(fallback)
        .with_timezone(&Utc)
}

/// Spawns the scheduler as the process's single rotation task.
pub fn spawn_rotation_task(
    scheduler: RotationScheduler,
    shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        scheduler.run(shutdown).await;
    })
}
