use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

use lectern_core::ParticipantId;

/// Tunables for credit scoring and the presence sweep.
#[derive(Debug, Clone)]
pub struct EngagementPolicy {
    /// Period of the background presence sweep.
    pub sweep_interval: Duration,
    /// Continuous membership required before the one-time bonus.
    pub duration_threshold: Duration,
    pub bonus_amount: i64,
    pub signal_penalty: i64,
    /// Labels that count against a participant's credit.
    pub disengagement_labels: HashSet<String>,
}

impl Default for EngagementPolicy {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            duration_threshold: Duration::from_secs(30 * 60),
            bonus_amount: 100,
            signal_penalty: 1,
            disengagement_labels: ["distracted", "drowsy", "looking-away"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Progress of one participant toward the sustained-presence bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRecord {
    /// Counting from the first successful join. Short disconnects do not
    /// reset it; a rejoin keeps the original timestamp.
    Active { since: Instant },
    /// Bonus granted. Terminal.
    Rewarded,
}

/// Credit ledger and join records for one room.
///
/// Owned by the room actor, so every mutation here is already serialized
/// with admissions and sweep ticks for the same room.
pub struct Scorer {
    policy: EngagementPolicy,
    credits: HashMap<ParticipantId, i64>,
    join_records: HashMap<ParticipantId, JoinRecord>,
}

impl Scorer {
    pub fn new(policy: EngagementPolicy) -> Self {
        Self {
            policy,
            credits: HashMap::new(),
            join_records: HashMap::new(),
        }
    }

    /// Seeds the ledger from a persisted snapshot. Entries already present
    /// in memory win.
    pub fn hydrate(&mut self, credits: HashMap<ParticipantId, i64>) {
        for (participant, value) in credits {
            self.credits.entry(participant).or_insert(value);
        }
    }

    pub fn credit(&self, participant: &ParticipantId) -> Option<i64> {
        self.credits.get(participant).copied()
    }

    pub fn join_record(&self, participant: &ParticipantId) -> Option<JoinRecord> {
        self.join_records.get(participant).copied()
    }

    /// Called on every successful watcher admission. The credit entry and
    /// join record are created on the first join only; returns the initial
    /// credit value when a new entry was created, so the caller can persist
    /// it.
    pub fn admit(&mut self, participant: &ParticipantId, now: Instant) -> Option<i64> {
        self.join_records
            .entry(participant.clone())
            .or_insert(JoinRecord::Active { since: now });

        if self.credits.contains_key(participant) {
            return None;
        }
        self.credits.insert(participant.clone(), 0);
        Some(0)
    }

    /// Applies one disengagement signal, returning the new credit value.
    /// Unrecognized labels and signals for participants without a credit
    /// entry change nothing.
    pub fn apply_signal(&mut self, participant: &ParticipantId, label: &str) -> Option<i64> {
        if !self.policy.disengagement_labels.contains(label) {
            return None;
        }
        let credit = self.credits.get_mut(participant)?;
        *credit -= self.policy.signal_penalty;
        Some(*credit)
    }

    /// Participants whose active join records crossed the duration
    /// threshold as of `now`.
    pub fn due_for_bonus(&self, now: Instant) -> Vec<ParticipantId> {
        self.join_records
            .iter()
            .filter_map(|(participant, record)| match record {
                JoinRecord::Active { since }
                    if now.duration_since(*since) >= self.policy.duration_threshold =>
                {
                    Some(participant.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Grants the one-time bonus and retires the join record, returning the
    /// new credit value. A replay after the record reached `Rewarded`
    /// changes nothing.
    pub fn apply_duration_bonus(&mut self, participant: &ParticipantId) -> Option<i64> {
        match self.join_records.get_mut(participant) {
            Some(record) if matches!(record, JoinRecord::Active { .. }) => {
                *record = JoinRecord::Rewarded;
                let credit = self.credits.entry(participant.clone()).or_insert(0);
                *credit += self.policy.bonus_amount;
                Some(*credit)
            }
            _ => None,
        }
    }
}
