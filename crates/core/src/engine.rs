//! Simulation Playback Engine
//!
//! Walks an ordered interaction script, gates on learner input at nurse
//! prompts, scores submissions against keyword specs, and races an optional
//! countdown against manual completion. The engine is a synchronous state
//! machine: every operation returns the [`Effect`]s the host must carry out
//! (render a message, schedule a paced advance, arm the countdown, persist
//! the result). The host routes all external events (learner submissions,
//! pacing expiries, timer ticks) through one serialized loop, so engine
//! transitions never interleave.
//!
//! Session lifecycle: `Idle → Running ⇄ AwaitingInput → Done`. `Done` is
//! terminal; only a fresh `start` re-initializes the machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::evaluator::evaluate_response;
use crate::result::{ResponseRecord, SimulationResult, score_percentage};
use crate::scenario::{Interaction, Scenario};

/// Pause between consecutive scripted messages. Readability pacing only; any
/// fixed delay would be correct.
pub const MESSAGE_PACING: Duration = Duration::from_millis(1500);
/// Pause after a graded submission before the script continues.
pub const SUBMIT_PACING: Duration = Duration::from_millis(1000);

/// Scripted system message surfaced when the countdown expires mid-session.
pub const TIME_UP_MESSAGE: &str = "Time's up! The simulation has ended automatically.";

/// Who a rendered chat message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    System,
    Patient,
    Nurse,
}

/// A side effect the host must perform on the engine's behalf.
///
/// This is the seam that keeps the state machine synchronous and testable:
/// the engine decides, the session driver executes.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Surface a chat message to the renderer.
    ShowMessage { kind: MessageKind, text: String },
    /// The engine is suspended at a nurse prompt; unlock learner input.
    AwaitInput,
    /// Lock learner input.
    LockInput,
    /// Call `resume` after the given pacing delay.
    ScheduleAdvance { delay: Duration },
    /// Show or hide the countdown display.
    TimerVisible { visible: bool },
    /// Arm and start the countdown for this many seconds.
    StartTimer { seconds: u32 },
    /// Cancel the countdown.
    StopTimer,
    /// Forward the current remaining seconds to the renderer.
    TimerTick { remaining: u32 },
    /// The session is over; persist and display this result.
    Complete(SimulationResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    AwaitingInput,
    Done,
}

/// Playback state for one session. Constructed per session; no state leaks
/// across sessions because `start` resets every field.
pub struct SimulationEngine {
    scenario: Option<Scenario>,
    cursor: usize,
    score: usize,
    responses: Vec<ResponseRecord>,
    remaining_seconds: u32,
    timer_active: bool,
    phase: Phase,
}

impl SimulationEngine {
    pub fn new() -> Self {
        Self {
            scenario: None,
            cursor: 0,
            score: 0,
            responses: Vec::new(),
            remaining_seconds: 0,
            timer_active: false,
            phase: Phase::Idle,
        }
    }

    /// Begins a playback session, resetting all state from any previous run.
    ///
    /// Arms the countdown when the scenario is timed. An empty script
    /// completes immediately with a 0/0 result reported as 0%.
    pub fn start(&mut self, scenario: Scenario) -> Vec<Effect> {
        let mut effects = Vec::new();

        // A session restarted mid-run must not leave the old countdown firing.
        if self.timer_active {
            effects.push(Effect::StopTimer);
        }

        self.cursor = 0;
        self.score = 0;
        self.responses.clear();
        self.timer_active = scenario.is_timed();
        self.remaining_seconds = if self.timer_active {
            // Absurd authored values must not overflow the seconds counter.
            scenario.timer_minutes.unwrap_or(0).saturating_mul(60)
        } else {
            0
        };
        self.phase = Phase::Running;

        info!(
            scenario_id = %scenario.id,
            timed = self.timer_active,
            interactions = scenario.interactions.len(),
            "starting simulation"
        );

        if self.timer_active {
            effects.push(Effect::TimerVisible { visible: true });
            effects.push(Effect::StartTimer {
                seconds: self.remaining_seconds,
            });
        } else {
            effects.push(Effect::TimerVisible { visible: false });
        }

        self.scenario = Some(scenario);
        self.advance(&mut effects);
        effects
    }

    /// Driver callback for an elapsed pacing delay. Ignored unless the
    /// script is actively running (a stale delay can fire after completion).
    pub fn resume(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase != Phase::Running {
            return effects;
        }
        self.advance(&mut effects);
        effects
    }

    /// Grades a learner submission at the current nurse prompt.
    ///
    /// Defensive no-ops: ignored unless the engine is awaiting input (which
    /// also covers a submission racing timer expiry), and ignored when the
    /// text is blank after trimming.
    pub fn submit(&mut self, text: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase != Phase::AwaitingInput {
            debug!("ignoring submission outside of a nurse prompt");
            return effects;
        }
        let text = text.trim();
        if text.is_empty() {
            return effects;
        }

        let Some(Interaction::Nurse {
            expected_response,
            correct_response,
            rationale,
        }) = self.current_interaction()
        else {
            // Unreachable while the awaiting-input invariant holds.
            return effects;
        };

        let is_correct = evaluate_response(text, &expected_response);
        self.responses.push(ResponseRecord {
            expected: expected_response,
            student_answer: text.to_string(),
            correct_answer: correct_response,
            rationale,
            is_correct,
        });
        if is_correct {
            self.score += 1;
        }
        debug!(cursor = self.cursor, is_correct, "graded submission");

        effects.push(Effect::ShowMessage {
            kind: MessageKind::Nurse,
            text: text.to_string(),
        });
        effects.push(Effect::LockInput);

        self.cursor += 1;
        self.phase = Phase::Running;
        effects.push(Effect::ScheduleAdvance {
            delay: SUBMIT_PACING,
        });
        effects
    }

    /// Driver callback for each countdown tick.
    pub fn on_tick(&mut self, remaining: u32) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase == Phase::Done || !self.timer_active {
            return effects;
        }
        self.remaining_seconds = remaining;
        effects.push(Effect::TimerTick { remaining });
        effects
    }

    /// Driver callback when the countdown reaches zero: a forced early
    /// termination, distinct from natural completion.
    pub fn on_time_expired(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase == Phase::Done {
            return effects;
        }
        info!(cursor = self.cursor, "countdown expired; ending session");

        self.remaining_seconds = 0;
        effects.push(Effect::ShowMessage {
            kind: MessageKind::System,
            text: TIME_UP_MESSAGE.to_string(),
        });
        effects.push(Effect::LockInput);
        self.finish(&mut effects);
        effects
    }

    /// Steps the script at the cursor. Scripted messages auto-advance after
    /// a pacing delay; a nurse prompt suspends the engine until `submit`.
    fn advance(&mut self, effects: &mut Vec<Effect>) {
        let Some(interaction) = self.current_interaction() else {
            self.finish(effects);
            return;
        };

        match interaction {
            Interaction::System { message } => {
                effects.push(Effect::ShowMessage {
                    kind: MessageKind::System,
                    text: message,
                });
                self.cursor += 1;
                effects.push(Effect::ScheduleAdvance {
                    delay: MESSAGE_PACING,
                });
            }
            Interaction::Patient { message } => {
                effects.push(Effect::ShowMessage {
                    kind: MessageKind::Patient,
                    text: message,
                });
                self.cursor += 1;
                effects.push(Effect::ScheduleAdvance {
                    delay: MESSAGE_PACING,
                });
            }
            Interaction::Nurse { .. } => {
                self.phase = Phase::AwaitingInput;
                effects.push(Effect::AwaitInput);
            }
        }
    }

    /// Terminal transition. Idempotent: a natural completion racing timer
    /// expiry runs this once, the loser sees `Done` and backs off.
    fn finish(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == Phase::Done {
            return;
        }
        self.phase = Phase::Done;

        let had_timer = self.timer_active;
        if had_timer {
            effects.push(Effect::StopTimer);
            self.timer_active = false;
        }

        let total = self
            .scenario
            .as_ref()
            .map(Scenario::total_nurse_interactions)
            .unwrap_or(0);
        let score = score_percentage(self.score, total);

        let result = SimulationResult {
            score,
            total_questions: total,
            correct_answers: self.score,
            mistakes: self
                .responses
                .iter()
                .filter(|r| !r.is_correct)
                .cloned()
                .collect(),
            time_remaining: self.remaining_seconds,
            has_timer: had_timer,
        };
        info!(
            score,
            correct = self.score,
            total,
            "simulation finished"
        );
        effects.push(Effect::Complete(result));
    }

    fn current_interaction(&self) -> Option<Interaction> {
        self.scenario
            .as_ref()
            .and_then(|s| s.interactions.get(self.cursor))
            .cloned()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.phase == Phase::AwaitingInput
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::HospitalSetting;
    use chrono::Utc;

    fn scenario(timer_minutes: Option<u32>, interactions: Vec<Interaction>) -> Scenario {
        Scenario {
            id: "test-scenario".to_string(),
            title: "Test".to_string(),
            hospital_setting: HospitalSetting::Emergency,
            description: String::new(),
            patient_profile: String::new(),
            timer_minutes,
            interactions,
            created_by: "system".to_string(),
            date_created: Utc::now(),
        }
    }

    fn system(message: &str) -> Interaction {
        Interaction::System {
            message: message.to_string(),
        }
    }

    fn patient(message: &str) -> Interaction {
        Interaction::Patient {
            message: message.to_string(),
        }
    }

    fn nurse(expected: &str) -> Interaction {
        Interaction::Nurse {
            expected_response: expected.to_string(),
            correct_response: format!("model answer for '{expected}'"),
            rationale: String::new(),
        }
    }

    /// Runs pacing-delay callbacks until the engine stops scheduling them,
    /// standing in for the host's delay timers.
    fn drain_pacing(engine: &mut SimulationEngine, mut effects: Vec<Effect>) -> Vec<Effect> {
        let mut all = Vec::new();
        loop {
            let scheduled = effects
                .iter()
                .any(|e| matches!(e, Effect::ScheduleAdvance { .. }));
            all.extend(effects);
            if !scheduled {
                return all;
            }
            effects = engine.resume();
        }
    }

    fn completed_result(effects: &[Effect]) -> Option<SimulationResult> {
        effects.iter().find_map(|e| match e {
            Effect::Complete(result) => Some(result.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_scripted_messages_auto_advance_until_nurse_prompt() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(
            None,
            vec![system("Hi"), patient("It hurts"), nurse("pain")],
        ));

        // First step is synchronous: hidden timer, first message, pacing.
        assert_eq!(effects[0], Effect::TimerVisible { visible: false });
        assert_eq!(
            effects[1],
            Effect::ShowMessage {
                kind: MessageKind::System,
                text: "Hi".to_string()
            }
        );
        assert_eq!(
            effects[2],
            Effect::ScheduleAdvance {
                delay: MESSAGE_PACING
            }
        );
        assert_eq!(engine.cursor(), 1);

        let effects = engine.resume();
        assert_eq!(
            effects[0],
            Effect::ShowMessage {
                kind: MessageKind::Patient,
                text: "It hurts".to_string()
            }
        );
        assert_eq!(engine.cursor(), 2);

        let effects = engine.resume();
        assert_eq!(effects, vec![Effect::AwaitInput]);
        assert!(engine.is_awaiting_input());
        // Cursor holds at the nurse prompt until a submission arrives.
        assert_eq!(engine.cursor(), 2);
    }

    #[test]
    fn test_full_session_permissive_prompt_scores_full_marks() {
        // One graded prompt followed by one ungraded prompt.
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(
            None,
            vec![system("Hi"), nurse("pain,vitals"), nurse("")],
        ));
        let effects = drain_pacing(&mut engine, effects);
        assert!(engine.is_awaiting_input());
        assert!(completed_result(&effects).is_none());

        let effects = engine.submit("I will check vitals now");
        assert_eq!(
            effects[0],
            Effect::ShowMessage {
                kind: MessageKind::Nurse,
                text: "I will check vitals now".to_string()
            }
        );
        assert_eq!(effects[1], Effect::LockInput);
        let effects = drain_pacing(&mut engine, effects);
        assert!(engine.is_awaiting_input());
        assert!(completed_result(&effects).is_none());

        // Empty keyword spec accepts anything.
        let effects = engine.submit("ok");
        let effects = drain_pacing(&mut engine, effects);

        let result = completed_result(&effects).expect("session should complete");
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.score, 100);
        assert!(result.mistakes.is_empty());
        assert!(!result.has_timer);
        assert_eq!(result.time_remaining, 0);
        assert!(engine.is_done());
    }

    #[test]
    fn test_incorrect_answers_become_mistakes() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(None, vec![nurse("oxygen"), nurse("morphine")]));
        let effects = drain_pacing(&mut engine, effects);
        assert_eq!(effects, vec![Effect::TimerVisible { visible: false }, Effect::AwaitInput]);

        let effects = engine.submit("administer oxygen at 2L");
        let _ = drain_pacing(&mut engine, effects);
        let effects = engine.submit("call the family");
        let effects = drain_pacing(&mut engine, effects);

        let result = completed_result(&effects).expect("session should complete");
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.score, 50);
        assert_eq!(result.mistakes.len(), 1);
        let mistake = &result.mistakes[0];
        assert_eq!(mistake.expected, "morphine");
        assert_eq!(mistake.student_answer, "call the family");
        assert!(!mistake.is_correct);
    }

    #[test]
    fn test_empty_script_completes_immediately_at_zero_percent() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(None, vec![]));
        let result = completed_result(&effects).expect("empty script completes at once");
        assert_eq!(result.total_questions, 0);
        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.score, 0);
        assert!(engine.is_done());
    }

    #[test]
    fn test_blank_submission_is_rejected_without_state_change() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(None, vec![nurse("pain")]));
        let _ = drain_pacing(&mut engine, effects);
        assert!(engine.is_awaiting_input());

        assert!(engine.submit("").is_empty());
        assert!(engine.submit("   \t ").is_empty());
        assert!(engine.is_awaiting_input());
        assert_eq!(engine.cursor(), 0);

        // A real submission still works afterwards.
        let effects = engine.submit("assess pain");
        assert!(!effects.is_empty());
    }

    #[test]
    fn test_submission_outside_prompt_is_ignored() {
        let mut engine = SimulationEngine::new();
        let _ = engine.start(scenario(None, vec![system("Hi"), nurse("x")]));
        // Still paced on the system message; no prompt yet.
        assert!(engine.submit("early").is_empty());
        assert_eq!(engine.cursor(), 1);
    }

    #[test]
    fn test_timed_start_arms_countdown() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(Some(2), vec![nurse("x")]));
        assert_eq!(effects[0], Effect::TimerVisible { visible: true });
        assert_eq!(effects[1], Effect::StartTimer { seconds: 120 });
        assert_eq!(engine.remaining_seconds(), 120);

        let effects = engine.on_tick(119);
        assert_eq!(effects, vec![Effect::TimerTick { remaining: 119 }]);
        assert_eq!(engine.remaining_seconds(), 119);
    }

    #[test]
    fn test_oversized_timer_minutes_saturates_instead_of_overflowing() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(Some(u32::MAX), vec![nurse("x")]));
        assert_eq!(effects[0], Effect::TimerVisible { visible: true });
        assert_eq!(
            effects[1],
            Effect::StartTimer {
                seconds: u32::MAX
            }
        );
        assert_eq!(engine.remaining_seconds(), u32::MAX);
    }

    #[test]
    fn test_timer_expiry_forces_early_termination() {
        // One-minute timer, one nurse prompt that never gets answered.
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(Some(1), vec![nurse("pain")]));
        let _ = drain_pacing(&mut engine, effects);
        assert!(engine.is_awaiting_input());

        for remaining in (0..60).rev() {
            let _ = engine.on_tick(remaining);
        }
        let effects = engine.on_time_expired();
        assert_eq!(
            effects[0],
            Effect::ShowMessage {
                kind: MessageKind::System,
                text: TIME_UP_MESSAGE.to_string()
            }
        );
        assert_eq!(effects[1], Effect::LockInput);
        assert!(effects.contains(&Effect::StopTimer));

        let result = completed_result(&effects).expect("expiry finishes the session");
        assert_eq!(result.total_questions, 1);
        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.score, 0);
        // The unanswered prompt was never logged, so there is no mistake
        // record for it.
        assert!(result.mistakes.is_empty());
        assert_eq!(result.time_remaining, 0);
        assert!(result.has_timer);
        assert!(engine.is_done());
    }

    #[test]
    fn test_submission_after_expiry_has_no_effect() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(Some(1), vec![nurse("pain")]));
        let _ = drain_pacing(&mut engine, effects);
        let _ = engine.on_time_expired();
        assert!(engine.is_done());

        assert!(engine.submit("assess pain").is_empty());
        assert!(engine.is_done());
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn test_expiry_after_completion_is_a_no_op() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(None, vec![nurse("")]));
        let _ = drain_pacing(&mut engine, effects);
        let effects = engine.submit("done");
        let effects = drain_pacing(&mut engine, effects);
        assert!(completed_result(&effects).is_some());

        // Double-finish guard: a racing expiry must not emit a second result.
        assert!(engine.on_time_expired().is_empty());
        assert!(engine.on_tick(5).is_empty());
        assert!(engine.resume().is_empty());
    }

    #[test]
    fn test_timer_result_reflects_remaining_seconds() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(Some(1), vec![nurse("")]));
        let _ = drain_pacing(&mut engine, effects);
        let _ = engine.on_tick(59);
        let _ = engine.on_tick(58);

        let effects = engine.submit("ok");
        let effects = drain_pacing(&mut engine, effects);
        let result = completed_result(&effects).expect("session should complete");
        assert_eq!(result.time_remaining, 58);
        assert!(result.has_timer);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_cursor_is_monotonic_and_bounded() {
        let script = vec![system("a"), nurse(""), patient("b"), nurse("")];
        let len = script.len();
        let mut engine = SimulationEngine::new();
        let mut last = 0;

        let mut effects = engine.start(scenario(None, script));
        loop {
            assert!(engine.cursor() >= last, "cursor went backwards");
            assert!(engine.cursor() <= len, "cursor past script end");
            last = engine.cursor();

            if completed_result(&effects).is_some() {
                break;
            }
            effects = if engine.is_awaiting_input() {
                engine.submit("answer")
            } else {
                engine.resume()
            };
        }
        assert_eq!(engine.cursor(), len);
    }

    #[test]
    fn test_restart_resets_all_playback_state() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(None, vec![nurse("alpha")]));
        let _ = drain_pacing(&mut engine, effects);
        let effects = engine.submit("no match here");
        let effects = drain_pacing(&mut engine, effects);
        assert_eq!(completed_result(&effects).unwrap().score, 0);

        // A fresh start must not leak the previous log or score.
        let effects = engine.start(scenario(None, vec![nurse("alpha")]));
        let _ = drain_pacing(&mut engine, effects);
        let effects = engine.submit("alpha response");
        let effects = drain_pacing(&mut engine, effects);
        let result = completed_result(&effects).unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.correct_answers, 1);
        assert!(result.mistakes.is_empty());
    }

    #[test]
    fn test_restart_of_timed_session_stops_stale_countdown() {
        let mut engine = SimulationEngine::new();
        let _ = engine.start(scenario(Some(1), vec![nurse("x")]));
        let effects = engine.start(scenario(None, vec![nurse("x")]));
        // The stale countdown is cancelled before the new session begins.
        assert_eq!(effects[0], Effect::StopTimer);
        assert_eq!(effects[1], Effect::TimerVisible { visible: false });
    }

    #[test]
    fn test_rounded_percentage_two_of_three() {
        let mut engine = SimulationEngine::new();
        let effects = engine.start(scenario(None, vec![nurse("a"), nurse("b"), nurse("c")]));
        let _ = drain_pacing(&mut engine, effects);

        let mut final_effects = Vec::new();
        for answer in ["has a in it", "has b in it", "zzz"] {
            let effects = engine.submit(answer);
            final_effects = drain_pacing(&mut engine, effects);
        }
        assert!(engine.is_done());
        let result = completed_result(&final_effects).expect("session should complete");
        // 2/3 rounds to 67.
        assert_eq!(result.score, 67);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.mistakes.len(), 1);
    }
}
