use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::state::{progress_percentage, PendingDetail, WizardState};
use super::text::IntakeSettings;
use super::view::{
    CategoryView, DetailView, Panel, ResultView, ReviewView, SelectedView, SessionView,
    SymptomOption, VoiceView,
};
use super::{IntakeError, MAX_SELECTED};
use crate::models::{
    MicrophonePermission, PredictionMatch, SelectedSymptom, Severity, Theme, TimeSpan,
};
use crate::remote::RemoteError;
use crate::voice::{AudioClip, AudioSource, RelayedMicrophone, VoiceSession};

/// Transient inline message that expires on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// All intake state for one visitor.
#[derive(Debug)]
pub struct IntakeSession {
    settings: Arc<IntakeSettings>,
    query: String,
    expanded: HashMap<String, bool>,
    selected: Vec<SelectedSymptom>,
    state: WizardState,
    notice: Option<Notice>,
    status_message: Option<String>,
    voice: VoiceSession,
    theme: Theme,
}

impl IntakeSession {
    /// Fresh session: empty query, nothing selected, only the first
    /// category expanded.
    pub fn new(settings: Arc<IntakeSettings>) -> Self {
        let expanded = settings
            .catalog
            .categories()
            .into_iter()
            .enumerate()
            .map(|(i, category)| (category.to_string(), i == 0))
            .collect();

        Self {
            settings,
            query: String::new(),
            expanded,
            selected: Vec::new(),
            state: WizardState::default(),
            notice: None,
            status_message: None,
            voice: Default::default(),
            theme: Theme::default(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn selected(&self) -> &[SelectedSymptom] {
        &self.selected
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_expanded(&self, category: &str) -> bool {
        self.expanded.get(category).copied().unwrap_or(false)
    }

    pub fn is_selected(&self, symptom_id: &str) -> bool {
        self.selected.iter().any(|s| s.id() == symptom_id)
    }

    /// Names of the selected symptoms, comma-joined.
    pub fn symptom_text(&self) -> String {
        self.selected
            .iter()
            .map(SelectedSymptom::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn invalid(&self, action: &'static str) -> IntakeError {
        IntakeError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Search & categories
    // ═══════════════════════════════════════════════════════════

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Flips one category's expanded flag and returns the new value.
    pub fn toggle_category(&mut self, category: &str) -> Result<bool, IntakeError> {
        let flag = self
            .expanded
            .get_mut(category)
            .ok_or_else(|| IntakeError::UnknownCategory(category.to_string()))?;
        *flag = !*flag;
        Ok(*flag)
    }

    // ═══════════════════════════════════════════════════════════
    // Selection & detail capture
    // ═══════════════════════════════════════════════════════════

    /// Removes an already-selected symptom, or opens detail capture for a
    /// new one. At the cap nothing happens and `SelectionFull` is returned.
    pub fn toggle_symptom(&mut self, symptom_id: &str) -> Result<(), IntakeError> {
        if !matches!(self.state, WizardState::Selecting) {
            return Err(self.invalid("select symptoms"));
        }
        let symptom = self
            .settings
            .catalog
            .get(symptom_id)
            .ok_or_else(|| IntakeError::UnknownSymptom(symptom_id.to_string()))?;

        if self.is_selected(symptom_id) {
            self.selected.retain(|s| s.id() != symptom_id);
            return Ok(());
        }
        if self.selected.len() >= MAX_SELECTED {
            return Err(IntakeError::SelectionFull(MAX_SELECTED));
        }

        self.state = WizardState::DetailCapture(PendingDetail::new(symptom.clone()));
        Ok(())
    }

    /// Edits the open detail modal. `None` leaves a field as it is.
    pub fn set_detail(
        &mut self,
        duration: Option<TimeSpan>,
        severity: Option<Severity>,
    ) -> Result<(), IntakeError> {
        let WizardState::DetailCapture(pending) = &mut self.state else {
            return Err(self.invalid("edit details"));
        };
        if let Some(duration) = duration {
            pending.duration = duration;
        }
        if let Some(severity) = severity {
            pending.severity = severity;
        }
        Ok(())
    }

    /// Moves the candidate into the selected set.
    pub fn confirm_detail(&mut self) -> Result<(), IntakeError> {
        let pending = match std::mem::take(&mut self.state) {
            WizardState::DetailCapture(pending) => pending,
            other => {
                self.state = other;
                return Err(self.invalid("confirm details"));
            }
        };

        self.selected.push(SelectedSymptom {
            symptom: pending.symptom,
            duration: pending.duration,
            severity: pending.severity,
        });
        self.state = WizardState::Selecting;
        Ok(())
    }

    pub fn cancel_detail(&mut self) -> Result<(), IntakeError> {
        if !matches!(self.state, WizardState::DetailCapture(_)) {
            return Err(self.invalid("cancel details"));
        }
        self.state = WizardState::Selecting;
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), IntakeError> {
        if !matches!(self.state, WizardState::Selecting) {
            return Err(self.invalid("clear the selection"));
        }
        self.selected.clear();
        Ok(())
    }

    /// Removes one selected symptom from the review list. Removing the
    /// last one goes back to selection.
    pub fn remove_symptom(&mut self, symptom_id: &str) -> Result<(), IntakeError> {
        if !matches!(
            self.state,
            WizardState::Selecting | WizardState::Reviewing | WizardState::Error(_)
        ) {
            return Err(self.invalid("remove symptoms"));
        }
        if !self.is_selected(symptom_id) {
            return Err(IntakeError::NotSelected(symptom_id.to_string()));
        }

        self.selected.retain(|s| s.id() != symptom_id);
        if self.selected.is_empty() {
            self.state = WizardState::Selecting;
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Step navigation
    // ═══════════════════════════════════════════════════════════

    /// Goes to the review step. With nothing selected a notice is shown
    /// instead and the session stays on step 1.
    pub fn continue_to_review(&mut self, now: DateTime<Utc>) -> Result<(), IntakeError> {
        if !matches!(self.state, WizardState::Selecting) {
            return Err(self.invalid("continue"));
        }
        if self.selected.is_empty() {
            self.notice = Some(Notice {
                message: self.settings.text.no_selection.clone(),
                expires_at: now + self.settings.notice_ttl,
            });
            return Err(IntakeError::NothingSelected);
        }

        self.notice = None;
        self.state = WizardState::Reviewing;
        Ok(())
    }

    /// "Back to Symptoms". Leaving a result or error discards it.
    pub fn back_to_selection(&mut self) -> Result<(), IntakeError> {
        match self.state {
            WizardState::Reviewing | WizardState::Result(_) | WizardState::Error(_) => {
                self.state = WizardState::Selecting;
                self.status_message = None;
                Ok(())
            }
            _ => Err(self.invalid("go back")),
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Submission
    // ═══════════════════════════════════════════════════════════

    /// Enters `Submitting` and returns the text to send.
    pub fn begin_submission(&mut self) -> Result<String, IntakeError> {
        match self.state {
            WizardState::Submitting => return Err(IntakeError::AlreadySubmitting),
            WizardState::Reviewing | WizardState::Error(_) => {}
            _ => return Err(self.invalid("submit")),
        }
        if self.selected.is_empty() {
            return Err(IntakeError::NothingSelected);
        }

        self.state = WizardState::Submitting;
        self.status_message = None;
        Ok(self.symptom_text())
    }

    /// Applies the prediction outcome. Returns false when the session was
    /// not waiting for one.
    pub fn finish_submission(
        &mut self,
        outcome: Result<Vec<PredictionMatch>, RemoteError>,
    ) -> bool {
        if !self.state.is_submitting() {
            return false;
        }
        let text = &self.settings.text;

        match outcome {
            Ok(matches) if !matches.is_empty() => {
                self.state = WizardState::Result(matches);
                self.status_message = Some(text.analysis_complete.clone());
            }
            Ok(_) => {
                self.state = WizardState::Error(text.no_matches.clone());
                self.status_message = Some(text.submission_failed.clone());
            }
            Err(e) => {
                self.state = WizardState::Error(e.to_string());
                self.status_message = Some(text.submission_failed.clone());
            }
        }
        true
    }

    /// Leaves `Submitting` when the request never completed.
    pub fn abort_submission(&mut self) {
        if self.state.is_submitting() {
            self.state = WizardState::Error(self.settings.text.submission_interrupted.clone());
            self.status_message = Some(self.settings.text.submission_failed.clone());
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Voice
    // ═══════════════════════════════════════════════════════════

    pub fn start_voice(&mut self, permission: MicrophonePermission) -> Result<(), IntakeError> {
        self.start_voice_from(&RelayedMicrophone { permission })
    }

    pub fn start_voice_from(&mut self, source: &dyn AudioSource) -> Result<(), IntakeError> {
        let denied = self.settings.text.microphone_denied.clone();
        self.voice.start(source, &denied)?;
        Ok(())
    }

    pub fn push_voice_chunk(&mut self, chunk: Vec<u8>) -> Result<(), IntakeError> {
        self.voice.push_chunk(chunk)?;
        Ok(())
    }

    /// Ends recording. `Some(clip)` means transcription should start.
    pub fn stop_voice(&mut self) -> Result<Option<AudioClip>, IntakeError> {
        let empty = self.settings.text.no_transcript.clone();
        Ok(self.voice.stop(&empty)?)
    }

    pub fn fail_voice(&mut self, message: &str) {
        self.voice.fail(message);
    }

    /// Applies a transcription outcome; a transcript becomes the query.
    pub fn finish_transcription(&mut self, outcome: Result<String, RemoteError>) -> bool {
        if !self.voice.is_transcribing() {
            return false;
        }
        let text = &self.settings.text;
        let outcome = outcome.map_err(|e| match e {
            RemoteError::NoSpeech => text.no_transcript.clone(),
            other => {
                tracing::warn!(error = %other, "Transcription failed");
                text.transcription_failed.clone()
            }
        });
        let no_speech = text.no_transcript.clone();

        if let Some(transcript) = self.voice.complete_transcription(outcome, &no_speech) {
            self.query = transcript;
        }
        true
    }

    pub fn abort_transcription(&mut self) {
        let message = self.settings.text.transcription_failed.clone();
        self.voice.complete_transcription(Err(message), "");
    }

    pub fn is_transcribing(&self) -> bool {
        self.voice.is_transcribing()
    }

    pub fn dismiss_voice_error(&mut self) {
        self.voice.dismiss_error();
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    // ═══════════════════════════════════════════════════════════
    // View
    // ═══════════════════════════════════════════════════════════

    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        let step = self.state.step();
        let submitting = self.state.is_submitting();
        let has_room = self.selected.len() < MAX_SELECTED;

        let categories = self
            .settings
            .catalog
            .search(&self.query)
            .into_iter()
            .map(|group| CategoryView {
                category: group.category.to_string(),
                expanded: self.is_expanded(group.category),
                symptoms: group
                    .symptoms
                    .into_iter()
                    .map(|s| {
                        let selected = self.is_selected(&s.id);
                        SymptomOption {
                            id: s.id.clone(),
                            name: s.name.clone(),
                            selected,
                            selectable: selected || has_room,
                        }
                    })
                    .collect(),
            })
            .collect();

        let detail = match &self.state {
            WizardState::DetailCapture(p) => Some(DetailView {
                symptom: p.symptom.clone(),
                duration: p.duration,
                severity: p.severity,
                severity_label: p.severity.label(),
                severity_color: p.severity.level().color_scale(),
                durations: TimeSpan::ALL,
            }),
            _ => None,
        };

        let symptom_text = self.symptom_text();
        let panel = match &self.state {
            WizardState::Selecting | WizardState::DetailCapture(_) => None,
            WizardState::Result(matches) => Some(
                ResultView::from_matches(matches, &symptom_text, &self.settings.text.disclaimer)
                    .map(Panel::Result)
                    .unwrap_or_else(|| Panel::Review(ReviewView {
                        symptom_text: symptom_text.clone(),
                    })),
            ),
            _ => Some(Panel::Review(ReviewView {
                symptom_text: symptom_text.clone(),
            })),
        };

        let error = match &self.state {
            WizardState::Error(message) => Some(message.clone()),
            _ => None,
        };

        SessionView {
            step,
            stage: self.state.name(),
            progress: progress_percentage(step, self.selected.len(), submitting),
            theme: self.theme,
            query: self.query.clone(),
            categories,
            selected: self.selected.iter().map(SelectedView::from).collect(),
            max_selected: MAX_SELECTED,
            can_continue: matches!(self.state, WizardState::Selecting)
                && !self.selected.is_empty(),
            detail,
            panel,
            submitting,
            can_submit: matches!(self.state, WizardState::Reviewing | WizardState::Error(_))
                && !self.selected.is_empty(),
            error,
            status_message: self.status_message.clone(),
            notice: self
                .notice
                .as_ref()
                .filter(|n| n.is_active(now))
                .map(|n| n.message.clone()),
            voice: VoiceView {
                recording: self.voice.is_recording(),
                transcribing: self.voice.is_transcribing(),
                transcript: self.voice.transcript().map(str::to_string),
                error: self.voice.error().map(str::to_string),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SymptomCatalog;
    use crate::models::Symptom;

    fn session() -> IntakeSession {
        IntakeSession::new(Arc::new(IntakeSettings::default()))
    }

    fn small_session() -> IntakeSession {
        let catalog = SymptomCatalog::new(vec![
            Symptom::new("1", "Headache", "Neurological"),
            Symptom::new("2", "Fever", "General"),
            Symptom::new("3", "Cough", "Respiratory"),
            Symptom::new("4", "Fatigue", "General"),
            Symptom::new("5", "Nausea", "Digestive"),
            Symptom::new("6", "Rash", "Dermatological"),
        ])
        .unwrap();
        IntakeSession::new(Arc::new(IntakeSettings::new(catalog)))
    }

    fn select(s: &mut IntakeSession, id: &str) {
        s.toggle_symptom(id).unwrap();
        s.confirm_detail().unwrap();
    }

    fn flu() -> PredictionMatch {
        PredictionMatch {
            prediction: "Flu".into(),
            confidence: 0.82,
            medicines: vec!["Paracetamol".into()],
            dosages: vec!["500mg".into()],
            prices: vec!["20".into()],
        }
    }

    fn reviewing(s: &mut IntakeSession) {
        select(s, "2");
        select(s, "3");
        s.continue_to_review(Utc::now()).unwrap();
    }

    #[test]
    fn only_first_category_starts_expanded() {
        let s = small_session();
        assert!(s.is_expanded("Neurological"));
        assert!(!s.is_expanded("General"));
        assert!(!s.is_expanded("Respiratory"));
    }

    #[test]
    fn toggle_category_flips_one_flag() {
        let mut s = small_session();
        assert_eq!(s.toggle_category("General"), Ok(true));
        assert!(s.is_expanded("General"));
        assert!(s.is_expanded("Neurological"));
        assert_eq!(s.toggle_category("Neurological"), Ok(false));
        assert!(s.is_expanded("General"));
        assert!(matches!(
            s.toggle_category("Nope"),
            Err(IntakeError::UnknownCategory(_))
        ));
    }

    #[test]
    fn selecting_opens_detail_without_touching_selection() {
        let mut s = small_session();
        s.toggle_symptom("2").unwrap();
        assert!(matches!(s.state(), WizardState::DetailCapture(p) if p.symptom.name == "Fever"));
        assert!(s.selected().is_empty());
    }

    #[test]
    fn fever_scenario_shows_severe() {
        let mut s = session();
        s.set_query("feve");
        let view = s.view(Utc::now());
        assert_eq!(view.categories[0].category, "General");
        assert_eq!(view.categories[0].symptoms[0].name, "Fever");

        let fever_id = view.categories[0].symptoms[0].id.clone();
        s.toggle_symptom(&fever_id).unwrap();
        s.set_detail(Some(TimeSpan::OneToThreeDays), Some(Severity::new(7).unwrap()))
            .unwrap();
        s.confirm_detail().unwrap();

        assert_eq!(s.selected().len(), 1);
        let chosen = &s.selected()[0];
        assert_eq!(chosen.name(), "Fever");
        assert_eq!(chosen.duration, TimeSpan::OneToThreeDays);
        assert_eq!(chosen.severity.value(), 7);

        let view = s.view(Utc::now());
        assert_eq!(view.selected[0].severity_label, "Severe");
        assert_eq!(view.step.number(), 1);
    }

    #[test]
    fn toggling_selected_symptom_removes_it() {
        let mut s = small_session();
        select(&mut s, "2");
        s.toggle_symptom("2").unwrap();
        assert!(s.selected().is_empty());
        assert_eq!(s.state(), &WizardState::Selecting);
    }

    #[test]
    fn fifth_selection_is_a_no_op() {
        let mut s = small_session();
        for id in ["1", "2", "3", "4"] {
            select(&mut s, id);
        }
        assert_eq!(s.toggle_symptom("5"), Err(IntakeError::SelectionFull(4)));
        assert_eq!(s.selected().len(), 4);
        assert_eq!(s.state(), &WizardState::Selecting);

        let view = s.view(Utc::now());
        let nausea = view
            .categories
            .iter()
            .flat_map(|c| &c.symptoms)
            .find(|o| o.id == "5")
            .unwrap();
        assert!(!nausea.selectable);
        assert_eq!(view.progress, 85);
    }

    #[test]
    fn selection_never_exceeds_cap() {
        let mut s = small_session();
        for round in 0..3 {
            for id in ["1", "2", "3", "4", "5", "6"] {
                let opened = s.toggle_symptom(id).is_ok()
                    && matches!(s.state(), WizardState::DetailCapture(_));
                if opened {
                    s.confirm_detail().unwrap();
                }
                assert!(s.selected().len() <= MAX_SELECTED, "round {round}");
            }
        }
    }

    #[test]
    fn cancel_discards_candidate() {
        let mut s = small_session();
        s.toggle_symptom("2").unwrap();
        s.set_detail(Some(TimeSpan::OverAMonth), None).unwrap();
        s.cancel_detail().unwrap();
        assert!(s.selected().is_empty());
        assert_eq!(s.state(), &WizardState::Selecting);
    }

    #[test]
    fn next_capture_starts_from_defaults() {
        let mut s = small_session();
        s.toggle_symptom("2").unwrap();
        s.set_detail(Some(TimeSpan::OverAMonth), Some(Severity::new(9).unwrap()))
            .unwrap();
        s.confirm_detail().unwrap();

        s.toggle_symptom("3").unwrap();
        let WizardState::DetailCapture(p) = s.state() else {
            panic!("detail not open");
        };
        assert_eq!(p.duration, TimeSpan::OneToThreeDays);
        assert_eq!(p.severity, Severity::default());
    }

    #[test]
    fn confirm_without_modal_is_rejected() {
        let mut s = small_session();
        assert!(matches!(
            s.confirm_detail(),
            Err(IntakeError::InvalidTransition { .. })
        ));
        assert_eq!(s.state(), &WizardState::Selecting);
    }

    #[test]
    fn toggling_while_modal_open_is_rejected() {
        let mut s = small_session();
        s.toggle_symptom("2").unwrap();
        assert!(s.toggle_symptom("3").is_err());
        assert!(matches!(s.state(), WizardState::DetailCapture(p) if p.symptom.id == "2"));
    }

    #[test]
    fn unknown_symptom_is_rejected() {
        let mut s = small_session();
        assert_eq!(
            s.toggle_symptom("999"),
            Err(IntakeError::UnknownSymptom("999".into()))
        );
    }

    #[test]
    fn continue_with_nothing_selected_sets_expiring_notice() {
        let mut s = small_session();
        let now = Utc::now();
        assert_eq!(s.continue_to_review(now), Err(IntakeError::NothingSelected));
        assert_eq!(s.state(), &WizardState::Selecting);
        assert_eq!(
            s.view(now).notice.as_deref(),
            Some("Please select at least one symptom")
        );
        let later = now + chrono::Duration::seconds(4);
        assert!(s.view(later).notice.is_none());
    }

    #[test]
    fn review_shows_review_panel_only() {
        let mut s = small_session();
        reviewing(&mut s);
        let view = s.view(Utc::now());
        assert_eq!(view.step.number(), 2);
        assert_eq!(view.progress, 95);
        assert!(view.can_submit);
        match view.panel {
            Some(Panel::Review(r)) => assert_eq!(r.symptom_text, "Fever, Cough"),
            other => panic!("unexpected panel: {other:?}"),
        }
    }

    #[test]
    fn submission_success_shows_result() {
        let mut s = small_session();
        reviewing(&mut s);
        assert_eq!(s.begin_submission().unwrap(), "Fever, Cough");
        assert_eq!(s.view(Utc::now()).progress, 98);
        assert!(s.finish_submission(Ok(vec![flu()])));

        let view = s.view(Utc::now());
        assert!(!view.submitting);
        assert_eq!(view.status_message.as_deref(), Some("Analysis complete!"));
        let Some(Panel::Result(result)) = view.panel else {
            panic!("result not shown");
        };
        assert_eq!(result.condition, "Flu");
        assert_eq!(result.confidence_label, "82.0% confidence");
        assert_eq!(result.medications[0].price, "₹20");
    }

    #[test]
    fn submission_failure_keeps_selection() {
        let mut s = small_session();
        reviewing(&mut s);
        let before = s.selected().to_vec();
        s.begin_submission().unwrap();
        s.finish_submission(Err(RemoteError::Status {
            status: 500,
            body: String::new(),
        }));

        let view = s.view(Utc::now());
        assert!(view.error.as_deref().unwrap().contains("500"));
        assert!(!view.submitting);
        assert!(!matches!(view.panel, Some(Panel::Result(_))));
        assert_eq!(s.selected(), before.as_slice());
        assert_eq!(
            view.status_message.as_deref(),
            Some("An error occurred. Please try again.")
        );

        // retry from the error state
        assert!(s.begin_submission().is_ok());
    }

    #[test]
    fn empty_matches_is_an_error() {
        let mut s = small_session();
        reviewing(&mut s);
        s.begin_submission().unwrap();
        s.finish_submission(Ok(Vec::new()));
        assert!(matches!(s.state(), WizardState::Error(_)));
    }

    #[test]
    fn double_submit_is_rejected() {
        let mut s = small_session();
        reviewing(&mut s);
        s.begin_submission().unwrap();
        assert_eq!(s.begin_submission(), Err(IntakeError::AlreadySubmitting));
    }

    #[test]
    fn submit_from_selection_is_rejected() {
        let mut s = small_session();
        select(&mut s, "2");
        assert!(matches!(
            s.begin_submission(),
            Err(IntakeError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn late_outcome_is_ignored() {
        let mut s = small_session();
        reviewing(&mut s);
        assert!(!s.finish_submission(Ok(vec![flu()])));
        assert_eq!(s.state(), &WizardState::Reviewing);
    }

    #[test]
    fn abort_leaves_submitting() {
        let mut s = small_session();
        reviewing(&mut s);
        s.begin_submission().unwrap();
        s.abort_submission();
        assert!(matches!(s.state(), WizardState::Error(_)));
    }

    #[test]
    fn removing_last_reviewed_symptom_returns_to_selection() {
        let mut s = small_session();
        reviewing(&mut s);
        s.remove_symptom("2").unwrap();
        assert_eq!(s.state(), &WizardState::Reviewing);
        s.remove_symptom("3").unwrap();
        assert_eq!(s.state(), &WizardState::Selecting);
        assert_eq!(
            s.remove_symptom("3"),
            Err(IntakeError::NotSelected("3".into()))
        );
    }

    #[test]
    fn back_from_result_clears_it() {
        let mut s = small_session();
        reviewing(&mut s);
        s.begin_submission().unwrap();
        s.finish_submission(Ok(vec![flu()]));
        s.back_to_selection().unwrap();
        assert_eq!(s.state(), &WizardState::Selecting);
        assert_eq!(s.selected().len(), 2);
        assert!(s.view(Utc::now()).panel.is_none());
    }

    #[test]
    fn clear_all_empties_selection() {
        let mut s = small_session();
        select(&mut s, "1");
        select(&mut s, "2");
        s.clear_selection().unwrap();
        assert!(s.selected().is_empty());
    }

    #[test]
    fn denied_microphone_sets_voice_error() {
        let mut s = small_session();
        s.set_query("fev");
        s.start_voice(MicrophonePermission::Denied).unwrap();
        let view = s.view(Utc::now());
        assert!(!view.voice.recording);
        assert!(!view.voice.error.unwrap().is_empty());
        assert!(view.voice.transcript.is_none());
        assert_eq!(s.query(), "fev");
    }

    #[test]
    fn transcript_replaces_query() {
        let mut s = small_session();
        s.set_query("zzz");
        s.start_voice(MicrophonePermission::Granted).unwrap();
        s.push_voice_chunk(vec![1, 2, 3]).unwrap();
        assert!(s.stop_voice().unwrap().is_some());
        assert!(s.finish_transcription(Ok("cough".into())));

        assert_eq!(s.query(), "cough");
        let view = s.view(Utc::now());
        assert_eq!(view.voice.transcript.as_deref(), Some("cough"));
        assert_eq!(view.categories.len(), 1);
        assert_eq!(view.categories[0].category, "Respiratory");
    }

    #[test]
    fn transcription_errors_use_copy() {
        let mut s = small_session();
        s.start_voice(MicrophonePermission::Granted).unwrap();
        s.push_voice_chunk(vec![1]).unwrap();
        s.stop_voice().unwrap();
        s.finish_transcription(Err(RemoteError::NoSpeech));
        assert_eq!(
            s.view(Utc::now()).voice.error.as_deref(),
            Some("No transcription available. Please try speaking again.")
        );

        s.start_voice(MicrophonePermission::Granted).unwrap();
        s.push_voice_chunk(vec![1]).unwrap();
        s.stop_voice().unwrap();
        s.finish_transcription(Err(RemoteError::Timeout(30)));
        assert_eq!(
            s.view(Utc::now()).voice.error.as_deref(),
            Some("Failed to transcribe audio. Please try again.")
        );
        assert!(!s.is_transcribing());
    }

    #[test]
    fn theme_toggles() {
        let mut s = small_session();
        assert_eq!(s.theme(), Theme::Light);
        assert_eq!(s.toggle_theme(), Theme::Dark);
        assert_eq!(s.toggle_theme(), Theme::Light);
    }
}
