//! Generation orchestration
//!
//! - [`GenerationSession`] tracks what the form has produced so far and
//!   rejects overlapping actions
//! - [`generate_transcript`] and [`generate_audio`] are the two actions
//! - [`GenerationWorker`] runs an action on its own thread and reports back
//!   through a channel the UI polls

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::chat::{ChatClient, ChatCompletionRequest, ChatMessage, OpenaiChatClient, TokenUsage};
use crate::config::{Credential, GeneratorConfig, Profile};
use crate::error::{GeneratorError, Result};
use crate::request::{format_minutes, PodcastRequest};
use crate::token_budget::BudgetOutcome;
use crate::tts::{build_synthesizer, ConversationSynthesizer, SpeechSynthesizer, TtsProvider, VoiceSelection};

const BUSY_MESSAGE: &str = "generation already in progress";
const NO_TRANSCRIPT_MESSAGE: &str = "Please generate podcast text first!";

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    TranscriptReady,
    AudioReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Transcript,
    Audio,
}

/// What the session has produced so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedArtifact {
    pub transcript_text: Option<String>,
    pub usage: Option<TokenUsage>,
    pub audio_file_path: Option<PathBuf>,
}

/// `Idle -> TranscriptReady -> AudioReady`, one task at a time
#[derive(Debug, Default)]
pub struct GenerationSession {
    phase: Phase,
    artifact: GeneratedArtifact,
    busy: Option<TaskKind>,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn artifact(&self) -> &GeneratedArtifact {
        &self.artifact
    }

    pub fn busy(&self) -> Option<TaskKind> {
        self.busy
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.busy.is_some() {
            return Err(GeneratorError::validation(BUSY_MESSAGE));
        }
        Ok(())
    }

    /// Validate and mark a transcript task as running
    pub fn begin_transcript(&mut self, request: &PodcastRequest) -> Result<()> {
        self.ensure_idle()?;
        request.validate()?;
        self.busy = Some(TaskKind::Transcript);
        Ok(())
    }

    /// Mark an audio task as running and hand back the transcript to render
    pub fn begin_audio(&mut self) -> Result<String> {
        self.ensure_idle()?;
        let transcript = self
            .artifact
            .transcript_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GeneratorError::validation(NO_TRANSCRIPT_MESSAGE))?
            .to_string();
        self.busy = Some(TaskKind::Audio);
        Ok(transcript)
    }

    pub fn complete_transcript(&mut self, text: String, usage: TokenUsage) {
        self.busy = None;
        self.artifact.transcript_text = Some(text);
        self.artifact.usage = Some(usage);
        self.artifact.audio_file_path = None;
        self.phase = Phase::TranscriptReady;
    }

    pub fn complete_audio(&mut self, path: PathBuf) {
        self.busy = None;
        self.artifact.audio_file_path = Some(path);
        self.phase = Phase::AudioReady;
    }

    /// Failed or cancelled task; phase and artifact stay as they were
    pub fn abort(&mut self) {
        self.busy = None;
    }

    /// Hand edits to the transcript editor; rejected while a task runs
    pub fn edit_transcript(&mut self, text: &str) -> Result<()> {
        self.ensure_idle()?;

        if text.trim().is_empty() {
            self.artifact.transcript_text = None;
            self.artifact.audio_file_path = None;
            self.phase = Phase::Idle;
            return Ok(());
        }

        self.artifact.transcript_text = Some(text.to_string());
        if self.phase == Phase::Idle {
            self.phase = Phase::TranscriptReady;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptOutcome {
    pub text: String,
    pub usage: TokenUsage,
    pub budget: BudgetOutcome,
    pub duration_minutes: f64,
}

/// One chat completion for `request` under `profile`'s budget
pub async fn generate_transcript(
    client: &dyn ChatClient,
    config: &GeneratorConfig,
    profile: Profile,
    request: &PodcastRequest,
) -> Result<TranscriptOutcome> {
    request.validate()?;

    let policy = config.budget_policy(profile);
    let budget = BudgetOutcome::resolve(
        policy.tokens_for_duration(request.duration_minutes),
        config.provider_ceiling(profile),
    );
    if let Some(warning) = budget.warning() {
        ::log::warn!("{}", warning);
    }

    let chat_request = ChatCompletionRequest {
        model: config.chat.model.clone(),
        messages: vec![
            ChatMessage::system(request.system_message(&config.default_system_prompt)),
            ChatMessage::user(request.user_message()),
        ],
        temperature: config.chat.temperature,
        max_tokens: budget.effective,
    };

    let completion = client.complete(chat_request).await?;
    Ok(TranscriptOutcome {
        text: completion.content,
        usage: completion.usage,
        budget,
        duration_minutes: request.duration_minutes,
    })
}

/// Render `transcript` to `<output_dir>/podcast.mp3`.
///
/// `cancel` only interrupts synthesis; the write and rename always run to
/// completion.
pub async fn generate_audio(
    synthesizer: Box<dyn SpeechSynthesizer>,
    config: &GeneratorConfig,
    transcript: &str,
    voices: &VoiceSelection,
    output_dir: &Path,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    if transcript.trim().is_empty() {
        return Err(GeneratorError::validation(NO_TRANSCRIPT_MESSAGE));
    }
    let conversation = ConversationSynthesizer::new(synthesizer, &config.tts.ending_message)?;

    let audio = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(GeneratorError::Cancelled),
        audio = conversation.render(transcript, voices) => audio?,
    };
    conversation.save(&audio, output_dir).await
}

// ============================================================================
// STATUS LINES
// ============================================================================

pub fn transcript_status(outcome: &TranscriptOutcome) -> String {
    let status = format!(
        "Podcast text generated successfully! (Target duration: {} minutes)",
        format_minutes(outcome.duration_minutes)
    );
    match outcome.budget.warning() {
        Some(warning) => format!("{} Warning: {}", status, warning),
        None => status,
    }
}

pub fn audio_status(path: &Path) -> String {
    format!("Audio generated successfully! Saved to: {}", path.display())
}

pub fn failure_status(kind: TaskKind, message: &str) -> String {
    match kind {
        TaskKind::Transcript => format!("Error: {}", message),
        TaskKind::Audio => format!("Error generating audio: {}", message),
    }
}

// ============================================================================
// WORKER
// ============================================================================

/// Work handed to the background thread
#[derive(Debug, Clone)]
pub enum GenerationCommand {
    Transcript {
        request: PodcastRequest,
        profile: Profile,
    },
    Audio {
        transcript: String,
        provider: TtsProvider,
        voices: VoiceSelection,
        output_dir: PathBuf,
    },
}

impl GenerationCommand {
    pub fn kind(&self) -> TaskKind {
        match self {
            GenerationCommand::Transcript { .. } => TaskKind::Transcript,
            GenerationCommand::Audio { .. } => TaskKind::Audio,
        }
    }
}

/// Results sent back to the UI thread
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    TranscriptReady {
        request_id: u64,
        outcome: TranscriptOutcome,
    },
    AudioReady {
        request_id: u64,
        path: PathBuf,
    },
    Failed {
        request_id: u64,
        kind: TaskKind,
        message: String,
        level: &'static str,
    },
    Cancelled {
        request_id: u64,
        kind: TaskKind,
    },
}

impl GenerationEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            GenerationEvent::TranscriptReady { request_id, .. }
            | GenerationEvent::AudioReady { request_id, .. }
            | GenerationEvent::Failed { request_id, .. }
            | GenerationEvent::Cancelled { request_id, .. } => *request_id,
        }
    }
}

pub type SynthesizerFactory =
    Arc<dyn Fn(TtsProvider, &GeneratorConfig) -> Result<Box<dyn SpeechSynthesizer>> + Send + Sync>;

/// Runs generation commands off the UI thread.
///
/// Every submission gets a new request id; events carrying an older id are
/// dropped by [`GenerationWorker::poll`].
pub struct GenerationWorker {
    config: Arc<GeneratorConfig>,
    chat: Arc<dyn ChatClient>,
    synthesizers: SynthesizerFactory,
    event_tx: Sender<GenerationEvent>,
    event_rx: Receiver<GenerationEvent>,
    request_id: u64,
    active: Arc<Mutex<Option<(u64, CancellationToken)>>>,
}

impl GenerationWorker {
    /// Worker backed by the configured OpenAI chat endpoint and TTS adapters
    pub fn new(config: Arc<GeneratorConfig>) -> Result<Self> {
        let chat = OpenaiChatClient::new(&config.chat, config.keys.get(Credential::OpenAi)?);
        Ok(Self::with_backends(
            config,
            Arc::new(chat),
            Arc::new(|provider: TtsProvider, config: &GeneratorConfig| build_synthesizer(provider, config)),
        ))
    }

    pub fn with_backends(
        config: Arc<GeneratorConfig>,
        chat: Arc<dyn ChatClient>,
        synthesizers: SynthesizerFactory,
    ) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            config,
            chat,
            synthesizers,
            event_tx,
            event_rx,
            request_id: 0,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &Arc<GeneratorConfig> {
        &self.config
    }

    pub fn current_request_id(&self) -> u64 {
        self.request_id
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Start `command` on a new thread and return its request id
    pub fn submit(&mut self, command: GenerationCommand) -> u64 {
        self.request_id = self.request_id.wrapping_add(1);
        let request_id = self.request_id;
        let kind = command.kind();

        let token = CancellationToken::new();
        *self.active.lock() = Some((request_id, token.clone()));

        let config = self.config.clone();
        let chat = self.chat.clone();
        let synthesizers = self.synthesizers.clone();
        let active = self.active.clone();
        let tx = self.event_tx.clone();

        ::log::info!("Starting {:?} task #{}", kind, request_id);

        thread::spawn(move || {
            let event = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => {
                    let result = runtime.block_on(run_command(
                        command,
                        &config,
                        chat.as_ref(),
                        &synthesizers,
                        &token,
                    ));
                    into_event(request_id, kind, result)
                }
                Err(e) => into_event(request_id, kind, Err(GeneratorError::Io(e))),
            };

            {
                let mut active = active.lock();
                if matches!(active.as_ref(), Some((id, _)) if *id == request_id) {
                    *active = None;
                }
            }

            if tx.send(event).is_err() {
                ::log::debug!("Task #{} finished after the receiver was dropped", request_id);
            }
        });

        request_id
    }

    /// Trip the running task's cancellation token
    pub fn cancel(&self) -> bool {
        match self.active.lock().as_ref() {
            Some((id, token)) => {
                ::log::info!("Cancelling task #{}", id);
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel anything running and ignore whatever it still reports
    pub fn invalidate(&mut self) {
        self.cancel();
        self.request_id = self.request_id.wrapping_add(1);
    }

    /// Drain pending events for the current request
    pub fn poll(&self) -> Vec<GenerationEvent> {
        self.event_rx
            .try_iter()
            .filter(|event| {
                let current = event.request_id() == self.request_id;
                if !current {
                    ::log::debug!("Dropping stale event for task #{}", event.request_id());
                }
                current
            })
            .collect()
    }
}

async fn run_command(
    command: GenerationCommand,
    config: &GeneratorConfig,
    chat: &dyn ChatClient,
    synthesizers: &SynthesizerFactory,
    cancel: &CancellationToken,
) -> Result<CommandOutput> {
    match command {
        GenerationCommand::Transcript { request, profile } => {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(GeneratorError::Cancelled),
                outcome = generate_transcript(chat, config, profile, &request) => {
                    outcome.map(CommandOutput::Transcript)
                }
            }
        }
        GenerationCommand::Audio {
            transcript,
            provider,
            voices,
            output_dir,
        } => {
            let synthesizer = (synthesizers.as_ref())(provider, config)?;
            generate_audio(synthesizer, config, &transcript, &voices, &output_dir, cancel)
                .await
                .map(CommandOutput::Audio)
        }
    }
}

enum CommandOutput {
    Transcript(TranscriptOutcome),
    Audio(PathBuf),
}

fn into_event(request_id: u64, kind: TaskKind, result: Result<CommandOutput>) -> GenerationEvent {
    match result {
        Ok(CommandOutput::Transcript(outcome)) => GenerationEvent::TranscriptReady { request_id, outcome },
        Ok(CommandOutput::Audio(path)) => GenerationEvent::AudioReady { request_id, path },
        Err(GeneratorError::Cancelled) => GenerationEvent::Cancelled { request_id, kind },
        Err(err) => {
            ::log::error!("{:?} task #{} failed: {}", kind, request_id, err);
            GenerationEvent::Failed {
                request_id,
                kind,
                message: err.to_string(),
                level: err.log_level(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatCompletion;
    use crate::request::{PodcastStyle, SpeakerCount};
    use std::time::{Duration, Instant};

    /// Records the last request and answers with a fixed transcript
    struct MockChat {
        last: Mutex<Option<ChatCompletionRequest>>,
        delay: Option<Duration>,
        fail: bool,
    }

    impl MockChat {
        fn new() -> Self {
            Self { last: Mutex::new(None), delay: None, fail: false }
        }
    }

    #[async_trait::async_trait]
    impl ChatClient for MockChat {
        async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletion> {
            *self.last.lock() = Some(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(GeneratorError::chat("503 Service Unavailable: overloaded"));
            }
            Ok(ChatCompletion {
                content: "Welcome to the show\nGlad to be here".to_string(),
                usage: TokenUsage { prompt_tokens: 10, completion_tokens: 20, total_tokens: 30 },
            })
        }
    }

    struct EchoSynth;

    #[async_trait::async_trait]
    impl SpeechSynthesizer for EchoSynth {
        fn provider(&self) -> TtsProvider {
            TtsProvider::OpenAi
        }

        async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
            Ok(format!("{}:{};", voice, text).into_bytes())
        }
    }

    fn echo_factory() -> SynthesizerFactory {
        Arc::new(|_: TtsProvider, _: &GeneratorConfig| Ok(Box::new(EchoSynth) as Box<dyn SpeechSynthesizer>))
    }

    fn request(minutes: f64) -> PodcastRequest {
        PodcastRequest::new("Rust async", PodcastStyle::Casual, SpeakerCount::Two, minutes, "")
    }

    fn wait_for_event(worker: &GenerationWorker) -> GenerationEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(event) = worker.poll().into_iter().next() {
                return event;
            }
            assert!(Instant::now() < deadline, "timed out waiting for worker event");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_session_happy_path() {
        let mut session = GenerationSession::new();
        assert_eq!(session.phase(), Phase::Idle);

        session.begin_transcript(&request(5.0)).unwrap();
        assert_eq!(session.busy(), Some(TaskKind::Transcript));
        session.complete_transcript("a\nb".to_string(), TokenUsage::default());
        assert_eq!(session.phase(), Phase::TranscriptReady);

        assert_eq!(session.begin_audio().unwrap(), "a\nb");
        session.complete_audio(PathBuf::from("output/podcast.mp3"));
        assert_eq!(session.phase(), Phase::AudioReady);
        assert!(session.busy().is_none());

        // A new transcript invalidates the old audio
        session.begin_transcript(&request(5.0)).unwrap();
        session.complete_transcript("c".to_string(), TokenUsage::default());
        assert_eq!(session.phase(), Phase::TranscriptReady);
        assert!(session.artifact().audio_file_path.is_none());
    }

    #[test]
    fn test_session_rejects_overlap_and_empty_input() {
        let mut session = GenerationSession::new();
        assert_eq!(
            session.begin_audio().unwrap_err().to_string(),
            "Please generate podcast text first!"
        );

        let blank = PodcastRequest::new("  ", PodcastStyle::Casual, SpeakerCount::Two, 5.0, "");
        assert_eq!(
            session.begin_transcript(&blank).unwrap_err().to_string(),
            "Please enter some text first!"
        );

        session.begin_transcript(&request(5.0)).unwrap();
        assert_eq!(
            session.begin_transcript(&request(5.0)).unwrap_err().to_string(),
            "generation already in progress"
        );
        assert!(session.begin_audio().is_err());
    }

    #[test]
    fn test_session_failure_keeps_state() {
        let mut session = GenerationSession::new();
        session.begin_transcript(&request(5.0)).unwrap();
        session.complete_transcript("text".to_string(), TokenUsage::default());

        session.begin_audio().unwrap();
        session.abort();
        assert_eq!(session.phase(), Phase::TranscriptReady);
        assert_eq!(session.artifact().transcript_text.as_deref(), Some("text"));
        assert!(session.busy().is_none());
    }

    #[test]
    fn test_session_edits_and_clear() {
        let mut session = GenerationSession::new();
        session.edit_transcript("typed by hand").unwrap();
        assert_eq!(session.phase(), Phase::TranscriptReady);

        session.complete_audio(PathBuf::from("x.mp3"));
        session.edit_transcript("   ").unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.artifact().transcript_text.is_none());

        session.edit_transcript("again").unwrap();
        session.clear();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.artifact(), &GeneratedArtifact::default());
    }

    #[test]
    fn test_session_locks_transcript_while_busy() {
        let mut session = GenerationSession::new();
        session.begin_transcript(&request(5.0)).unwrap();
        session.complete_transcript("a\nb".to_string(), TokenUsage::default());

        session.begin_audio().unwrap();
        assert_eq!(
            session.edit_transcript("").unwrap_err().to_string(),
            "generation already in progress"
        );
        assert_eq!(session.phase(), Phase::TranscriptReady);
        assert_eq!(session.artifact().transcript_text.as_deref(), Some("a\nb"));

        session.complete_audio(PathBuf::from("output/podcast.mp3"));
        assert_eq!(session.phase(), Phase::AudioReady);
        assert_eq!(session.artifact().transcript_text.as_deref(), Some("a\nb"));

        // Hand edits never survive an in-flight transcript task
        session.begin_transcript(&request(5.0)).unwrap();
        assert!(session.edit_transcript("typed meanwhile").is_err());
        session.complete_transcript("fresh".to_string(), TokenUsage::default());
        assert_eq!(session.artifact().transcript_text.as_deref(), Some("fresh"));
        session.edit_transcript("typed after").unwrap();
        assert_eq!(session.artifact().transcript_text.as_deref(), Some("typed after"));
    }

    #[tokio::test]
    async fn test_cancelled_audio_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("podcast.mp3"), "previous").unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let err = generate_audio(
            Box::new(EchoSynth),
            &GeneratorConfig::default(),
            "a\nb",
            &VoiceSelection::default(),
            dir.path(),
            &token,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GeneratorError::Cancelled));
        assert_eq!(std::fs::read_to_string(dir.path().join("podcast.mp3")).unwrap(), "previous");
        assert!(!dir.path().join("podcast.mp3.part").exists());
    }

    #[tokio::test]
    async fn test_generate_transcript_builds_request() {
        let chat = MockChat::new();
        let config = GeneratorConfig::default();

        let outcome = generate_transcript(&chat, &config, Profile::Classic, &request(5.0))
            .await
            .unwrap();
        assert_eq!(outcome.budget.effective, 750);
        assert_eq!(outcome.usage.total_tokens, 30);

        let sent = chat.last.lock().clone().unwrap();
        assert_eq!(sent.model, "gpt-4");
        assert_eq!(sent.max_tokens, 750);
        assert_eq!(sent.temperature, 0.7);
        assert_eq!(sent.messages[0].content, crate::request::DEFAULT_SYSTEM_PROMPT);
        assert!(sent.messages[1].content.starts_with("Create a casual podcast transcript with 2 speakers about: Rust async."));
    }

    #[tokio::test]
    async fn test_generate_transcript_applies_ceiling() {
        let chat = MockChat::new();
        let config = GeneratorConfig::default();

        let outcome = generate_transcript(&chat, &config, Profile::Extended, &request(10.0))
            .await
            .unwrap();
        assert_eq!(outcome.budget.requested, 4500);
        assert_eq!(outcome.budget.ceiling, Some(4096));
        assert_eq!(chat.last.lock().as_ref().map(|r| r.max_tokens), Some(4096));
        assert!(transcript_status(&outcome).contains("Warning"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_raw() {
        let mut chat = MockChat::new();
        chat.fail = true;
        let err = generate_transcript(&chat, &GeneratorConfig::default(), Profile::Classic, &request(5.0))
            .await
            .unwrap_err();
        assert_eq!(
            failure_status(TaskKind::Transcript, &err.to_string()),
            "Error: chat completion failed: 503 Service Unavailable: overloaded"
        );
    }

    #[test]
    fn test_worker_transcript_then_audio() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = GenerationWorker::with_backends(
            Arc::new(GeneratorConfig::default()),
            Arc::new(MockChat::new()),
            echo_factory(),
        );

        let id = worker.submit(GenerationCommand::Transcript {
            request: request(5.0),
            profile: Profile::Classic,
        });
        let transcript = match wait_for_event(&worker) {
            GenerationEvent::TranscriptReady { request_id, outcome } => {
                assert_eq!(request_id, id);
                outcome.text
            }
            other => panic!("unexpected event {:?}", other),
        };

        worker.submit(GenerationCommand::Audio {
            transcript,
            provider: TtsProvider::OpenAi,
            voices: VoiceSelection::default(),
            output_dir: dir.path().to_path_buf(),
        });
        match wait_for_event(&worker) {
            GenerationEvent::AudioReady { path, .. } => {
                assert_eq!(path, dir.path().join("podcast.mp3"));
                assert_eq!(
                    std::fs::read_to_string(path).unwrap(),
                    "echo:Welcome to the show;shimmer:Glad to be here;"
                );
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!worker.is_running());
    }

    #[test]
    fn test_worker_cancel() {
        let mut chat = MockChat::new();
        chat.delay = Some(Duration::from_secs(30));
        let mut worker = GenerationWorker::with_backends(
            Arc::new(GeneratorConfig::default()),
            Arc::new(chat),
            echo_factory(),
        );

        worker.submit(GenerationCommand::Transcript {
            request: request(5.0),
            profile: Profile::Classic,
        });
        assert!(worker.cancel());

        match wait_for_event(&worker) {
            GenerationEvent::Cancelled { kind, .. } => assert_eq!(kind, TaskKind::Transcript),
            other => panic!("unexpected event {:?}", other),
        }
    }

    /// Never finishes a turn, so only cancellation ends the task
    struct StalledSynth;

    #[async_trait::async_trait]
    impl SpeechSynthesizer for StalledSynth {
        fn provider(&self) -> TtsProvider {
            TtsProvider::OpenAi
        }

        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_worker_cancel_during_synthesis_leaves_output_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = GenerationWorker::with_backends(
            Arc::new(GeneratorConfig::default()),
            Arc::new(MockChat::new()),
            Arc::new(|_: TtsProvider, _: &GeneratorConfig| {
                Ok(Box::new(StalledSynth) as Box<dyn SpeechSynthesizer>)
            }),
        );

        worker.submit(GenerationCommand::Audio {
            transcript: "a\nb".to_string(),
            provider: TtsProvider::OpenAi,
            voices: VoiceSelection::default(),
            output_dir: dir.path().to_path_buf(),
        });
        thread::sleep(Duration::from_millis(50));
        assert!(worker.cancel());

        match wait_for_event(&worker) {
            GenerationEvent::Cancelled { kind, .. } => assert_eq!(kind, TaskKind::Audio),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!dir.path().join("podcast.mp3").exists());
        assert!(!dir.path().join("podcast.mp3.part").exists());
    }

    #[test]
    fn test_worker_drops_stale_events() {
        let mut worker = GenerationWorker::with_backends(
            Arc::new(GeneratorConfig::default()),
            Arc::new(MockChat::new()),
            echo_factory(),
        );

        worker.submit(GenerationCommand::Transcript {
            request: request(5.0),
            profile: Profile::Classic,
        });
        worker.invalidate();

        thread::sleep(Duration::from_millis(300));
        assert!(worker.poll().is_empty());
    }

    #[test]
    fn test_worker_reports_provider_config_error() {
        let mut worker = GenerationWorker::with_backends(
            Arc::new(GeneratorConfig::default()),
            Arc::new(MockChat::new()),
            Arc::new(|provider: TtsProvider, config: &GeneratorConfig| build_synthesizer(provider, config)),
        );

        worker.submit(GenerationCommand::Audio {
            transcript: "a\nb".to_string(),
            provider: TtsProvider::Gemini,
            voices: VoiceSelection::for_provider(TtsProvider::Gemini, "", ""),
            output_dir: PathBuf::from("unused"),
        });

        match wait_for_event(&worker) {
            GenerationEvent::Failed { kind, message, level, .. } => {
                assert_eq!(kind, TaskKind::Audio);
                assert!(message.contains("GEMINI_API_KEY"));
                assert_eq!(level, "ERROR");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
