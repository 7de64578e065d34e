use std::path::{Path, PathBuf};

use super::collect::{collect_metadata, confirm_proceed, summary_lines};
use super::destination::DestinationInitializer;
use super::port::{Notice, ProcessRunner, RepositoryFetcher, UserPrompt};
use crate::domain::error::{PromptError, ScaffoldError};
use crate::domain::model::{RoleMetadata, TemplateSource};
use crate::infrastructure::fetched_tree::FetchedTree;
use crate::infrastructure::transform::{TransformSummary, TreeTransformer};

pub const START_MESSAGE: &str = "Creating a new role from template. Let's get started!";
pub const REVIEW_MESSAGE: &str = "Please check you inputs. Is everything correct?";
pub const ABORT_MESSAGE: &str = "Aborting";
pub const SUCCESS_MESSAGE: &str = "Repository cloned, files modified, and copied successfully.";

/// `create` の結果。中断と辞退はエラーではない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created {
        path: PathBuf,
        summary: TransformSummary,
    },
    /// 入力が中断された (Esc / Ctrl+C)
    Cancelled,
    /// 確認で `y` / `yes` 以外が入力された
    Declined,
}

/// テンプレートからロールを作成するユースケース。
///
/// 入力収集 → 確認 → 出力先の存在確認 → 一時ディレクトリへの取得 →
/// 出力先の作成 → ツリー変換 の順に進み、一時ディレクトリはどの経路でも削除する。
pub struct CreateRoleUseCase<'a, P, R, F>
where
    P: UserPrompt,
    R: ProcessRunner,
    F: RepositoryFetcher,
{
    prompt: &'a P,
    runner: &'a R,
    fetcher: &'a F,
    source: TemplateSource,
    workdir: PathBuf,
    temp_root: Option<PathBuf>,
}

impl<'a, P, R, F> CreateRoleUseCase<'a, P, R, F>
where
    P: UserPrompt,
    R: ProcessRunner,
    F: RepositoryFetcher,
{
    pub fn new(
        prompt: &'a P,
        runner: &'a R,
        fetcher: &'a F,
        source: TemplateSource,
        workdir: &Path,
    ) -> Self {
        Self {
            prompt,
            runner,
            fetcher,
            source,
            workdir: workdir.to_path_buf(),
            temp_root: None,
        }
    }

    /// 一時ディレクトリを作る場所を変更する。
    pub fn with_temp_root(mut self, dir: &Path) -> Self {
        self.temp_root = Some(dir.to_path_buf());
        self
    }

    /// ユースケースを実行する。
    ///
    /// # Errors
    /// 出力先が既に存在する、取得・初期化・変換のいずれかに失敗した、
    /// または入力そのものに失敗した場合。
    pub fn execute(&self) -> Result<CreateOutcome, ScaffoldError> {
        self.prompt.notify(Notice::Info, START_MESSAGE);

        let metadata = match collect_metadata(self.prompt) {
            Ok(metadata) => metadata,
            Err(PromptError::Cancelled(message)) => {
                self.prompt.notify(Notice::Plain, &message);
                return Ok(CreateOutcome::Cancelled);
            }
            Err(e) => return Err(e.into()),
        };

        self.prompt.notify(Notice::Info, REVIEW_MESSAGE);
        for line in summary_lines(&metadata) {
            self.prompt.notify(Notice::Plain, &line);
        }
        if !confirm_proceed(self.prompt) {
            self.prompt.notify(Notice::Warning, ABORT_MESSAGE);
            return Ok(CreateOutcome::Declined);
        }

        let (path, summary) = self.scaffold(&metadata)?;
        self.prompt.notify(Notice::Success, SUCCESS_MESSAGE);
        Ok(CreateOutcome::Created { path, summary })
    }

    fn scaffold(&self, metadata: &RoleMetadata) -> Result<(PathBuf, TransformSummary), ScaffoldError> {
        let destination = DestinationInitializer::new(self.runner, &self.workdir, metadata);
        destination.ensure_absent()?;

        let fetched = FetchedTree::create(self.temp_root.as_deref())?;
        self.fetcher.fetch(&self.source, fetched.path())?;

        destination.create(metadata.gitinit)?;

        let transformer = TreeTransformer::new(metadata)?;
        let summary = transformer.transform(fetched.path(), destination.path())?;
        tracing::info!(
            path = %destination.path().display(),
            directories = summary.directories,
            files = summary.files,
            "role created"
        );
        Ok((destination.path().to_path_buf(), summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::ProcessOutput;
    use crate::domain::model::{License, Platform};
    #[cfg(unix)]
    use crate::infrastructure::process::SystemProcessRunner;
    use crate::infrastructure::process::{CannedResponse, RecordingRunner};
    use crate::infrastructure::scripted_prompt::ScriptedPrompt;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// 固定のファイル群を書き出すだけの取得処理。
    struct FakeFetcher {
        files: Vec<(&'static str, &'static str)>,
        fail: bool,
        fetched_into: RefCell<Vec<PathBuf>>,
    }

    impl FakeFetcher {
        fn with_files(files: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                files,
                fail: false,
                fetched_into: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                files: Vec::new(),
                fail: true,
                fetched_into: RefCell::new(Vec::new()),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetched_into.borrow().len()
        }
    }

    impl RepositoryFetcher for FakeFetcher {
        fn fetch(&self, _source: &TemplateSource, into: &Path) -> Result<(), ScaffoldError> {
            self.fetched_into.borrow_mut().push(into.to_path_buf());
            for (rel, content) in &self.files {
                let path = into.join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            if self.fail {
                return Err(ScaffoldError::Clone(
                    "exit status 128: fatal: repository not found".to_string(),
                ));
            }
            Ok(())
        }
    }

    struct Fixture {
        work: TempDir,
        temp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                work: TempDir::new().unwrap(),
                temp: TempDir::new().unwrap(),
            }
        }

        fn run(
            &self,
            prompt: &ScriptedPrompt,
            runner: &RecordingRunner,
            fetcher: &FakeFetcher,
        ) -> Result<CreateOutcome, ScaffoldError> {
            CreateRoleUseCase::new(
                prompt,
                runner,
                fetcher,
                TemplateSource::default(),
                self.work.path(),
            )
            .with_temp_root(self.temp.path())
            .execute()
        }

        fn temp_entries(&self) -> usize {
            fs::read_dir(self.temp.path()).unwrap().count()
        }
    }

    fn answers(gitinit: bool) -> ScriptedPrompt {
        ScriptedPrompt::new()
            .with_text("nginx")
            .with_text("Alice")
            .with_text("ACME")
            .with_text("web")
            .with_platforms(vec![Platform::Ubuntu2204])
            .with_license(License::Mit)
            .with_text("Installs nginx")
            .with_confirm(gitinit)
    }

    #[test]
    fn creates_role_from_fetched_tree() {
        let fixture = Fixture::new();
        let prompt = answers(false).with_line("y");
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::with_files(vec![
            ("meta/main.yml", "Role: template\nOwner: <<author>>"),
            (".git/HEAD", "ref: refs/heads/ant\n"),
        ]);

        let outcome = fixture.run(&prompt, &runner, &fetcher).unwrap();

        let dest = fixture.work.path().join("web.nginx");
        assert_eq!(
            outcome,
            CreateOutcome::Created {
                path: dest.clone(),
                summary: TransformSummary {
                    directories: 2,
                    files: 1,
                },
            }
        );
        assert_eq!(
            fs::read_to_string(dest.join("meta/main.yml")).unwrap(),
            "Role: nginx\nOwner: Alice"
        );
        assert!(!dest.join(".git").exists());
        assert_eq!(fixture.temp_entries(), 0);
        assert!(runner.calls().is_empty());

        let messages = prompt.messages();
        assert_eq!(messages.first().unwrap(), START_MESSAGE);
        assert!(messages.contains(&REVIEW_MESSAGE.to_string()));
        assert_eq!(messages.last().unwrap(), SUCCESS_MESSAGE);
    }

    #[test]
    fn git_init_runs_before_copy() {
        let fixture = Fixture::new();
        let prompt = answers(true).with_line("yes");
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::with_files(vec![("README.md", "# template\n")]);

        fixture.run(&prompt, &runner, &fetcher).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args[0], "init");
        assert_eq!(
            fs::read_to_string(fixture.work.path().join("web.nginx/README.md")).unwrap(),
            "# nginx\n"
        );
    }

    #[test]
    fn decline_has_no_side_effects() {
        let fixture = Fixture::new();
        let prompt = answers(false).with_line("n");
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::with_files(vec![("a.yml", "x")]);

        let outcome = fixture.run(&prompt, &runner, &fetcher).unwrap();

        assert_eq!(outcome, CreateOutcome::Declined);
        assert_eq!(prompt.messages().last().unwrap(), ABORT_MESSAGE);
        assert_eq!(fetcher.fetch_count(), 0);
        assert_eq!(fixture.temp_entries(), 0);
        assert_eq!(fs::read_dir(fixture.work.path()).unwrap().count(), 0);
    }

    #[test]
    fn unreadable_confirmation_is_decline() {
        let fixture = Fixture::new();
        let prompt = answers(false);
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::with_files(vec![]);

        let outcome = fixture.run(&prompt, &runner, &fetcher).unwrap();
        assert_eq!(outcome, CreateOutcome::Declined);
    }

    #[test]
    fn cancelled_input_ends_gracefully() {
        let fixture = Fixture::new();
        let prompt = ScriptedPrompt::new().with_text("nginx").with_text("Alice");
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::with_files(vec![]);

        let outcome = fixture.run(&prompt, &runner, &fetcher).unwrap();

        assert_eq!(outcome, CreateOutcome::Cancelled);
        assert_eq!(prompt.messages().last().unwrap(), "interrupt");
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[test]
    fn existing_destination_aborts_before_temp_dir() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.work.path().join("web.nginx")).unwrap();
        fs::write(fixture.work.path().join("web.nginx/keep.txt"), "mine").unwrap();
        let prompt = answers(true).with_line("y");
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::with_files(vec![("a.yml", "x")]);

        let err = fixture.run(&prompt, &runner, &fetcher).unwrap_err();

        assert!(matches!(err, ScaffoldError::DestinationExists(_)));
        assert_eq!(fetcher.fetch_count(), 0);
        assert!(runner.calls().is_empty());
        assert_eq!(fixture.temp_entries(), 0);
        assert_eq!(
            fs::read_to_string(fixture.work.path().join("web.nginx/keep.txt")).unwrap(),
            "mine"
        );
    }

    #[test]
    fn clone_failure_removes_temp_dir() {
        let fixture = Fixture::new();
        let prompt = answers(false).with_line("y");
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::failing();

        let err = fixture.run(&prompt, &runner, &fetcher).unwrap_err();

        assert!(err.to_string().starts_with("Error cloning repository:"));
        assert_eq!(fetcher.fetch_count(), 1);
        assert_eq!(fixture.temp_entries(), 0);
        assert!(!fixture.work.path().join("web.nginx").exists());
    }

    #[test]
    fn git_init_failure_copies_nothing() {
        let fixture = Fixture::new();
        let prompt = answers(true).with_line("y");
        let runner = RecordingRunner::new().with_response("git", CannedResponse::SpawnFailure);
        let fetcher = FakeFetcher::with_files(vec![("a.yml", "x")]);

        let err = fixture.run(&prompt, &runner, &fetcher).unwrap_err();

        assert!(matches!(err, ScaffoldError::GitInit(_)));
        assert!(!fixture.work.path().join("web.nginx").exists());
        assert_eq!(fixture.temp_entries(), 0);
    }

    #[test]
    fn git_init_nonzero_exit_is_failure() {
        let fixture = Fixture::new();
        let prompt = answers(true).with_line("y");
        let runner = RecordingRunner::new().with_response(
            "git",
            CannedResponse::Output(ProcessOutput {
                success: false,
                code: Some(1),
                output: Vec::new(),
            }),
        );
        let fetcher = FakeFetcher::with_files(vec![("a.yml", "x")]);

        let err = fixture.run(&prompt, &runner, &fetcher).unwrap_err();
        assert_eq!(err.to_string(), "Error initializing new repository: exit status 1");
    }

    /// `git` を一時スクリプトに差し替えて実際のプロセスとして起動する。
    #[cfg(unix)]
    struct ScriptedGit {
        script: PathBuf,
        cleanup_pending: RefCell<Vec<bool>>,
    }

    #[cfg(unix)]
    impl ScriptedGit {
        fn delegate(&self, program: &str, args: &[&str]) -> (String, Vec<String>) {
            assert_eq!(program, "git");
            self.cleanup_pending
                .borrow_mut()
                .push(crate::infrastructure::interrupt::INTERRUPT.has_pending_cleanup());
            let mut full = vec![self.script.to_string_lossy().to_string()];
            full.extend(args.iter().map(|a| a.to_string()));
            ("sh".to_string(), full)
        }
    }

    #[cfg(unix)]
    impl ProcessRunner for ScriptedGit {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            SystemProcessRunner::new().locate(program)
        }

        fn run(
            &self,
            program: &str,
            args: &[&str],
            cwd: Option<&Path>,
        ) -> Result<ProcessOutput, crate::domain::error::ProcessError> {
            let (program, args) = self.delegate(program, args);
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            SystemProcessRunner::new().run(&program, &args, cwd)
        }

        fn stream(
            &self,
            program: &str,
            args: &[&str],
            cwd: Option<&Path>,
        ) -> Result<ProcessOutput, crate::domain::error::ProcessError> {
            let (program, args) = self.delegate(program, args);
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            SystemProcessRunner::new().stream(&program, &args, cwd)
        }
    }

    #[cfg(unix)]
    #[test]
    fn clone_killed_by_signal_removes_temp_dir() {
        use crate::infrastructure::git::GitFetcher;

        let fixture = Fixture::new();
        let scripts = TempDir::new().unwrap();
        let script = scripts.path().join("git.sh");
        // クローン先を途中まで作ってから自分自身をシグナルで落とす
        fs::write(
            &script,
            "mkdir -p \"$9/.git\"\necho partial > \"$9/.git/HEAD\"\nkill -KILL $$\n",
        )
        .unwrap();
        let git = ScriptedGit {
            script,
            cleanup_pending: RefCell::new(Vec::new()),
        };
        let fetcher = GitFetcher::new(&git);
        let prompt = answers(false).with_line("y");

        let err = CreateRoleUseCase::new(
            &prompt,
            &git,
            &fetcher,
            TemplateSource::default(),
            fixture.work.path(),
        )
        .with_temp_root(fixture.temp.path())
        .execute()
        .unwrap_err();

        assert!(matches!(err, ScaffoldError::Clone(_)));
        assert_eq!(
            err.to_string(),
            "Error cloning repository: terminated by signal"
        );
        assert_eq!(*git.cleanup_pending.borrow(), vec![true]);
        assert_eq!(fixture.temp_entries(), 0);
        assert!(!fixture.work.path().join("web.nginx").exists());
    }

    #[test]
    fn transform_failure_keeps_written_files_and_removes_temp() {
        let fixture = Fixture::new();
        let prompt = answers(false).with_line("y");
        let runner = RecordingRunner::new();
        let fetcher = FakeFetcher::with_files(vec![
            ("a.yml", "name: <<name>>\n"),
            ("b.yml", "broken: <<name\n"),
        ]);

        let err = fixture.run(&prompt, &runner, &fetcher).unwrap_err();

        assert!(err.to_string().starts_with("Error copying files: b.yml: template: line 1"));
        let dest = fixture.work.path().join("web.nginx");
        assert_eq!(fs::read_to_string(dest.join("a.yml")).unwrap(), "name: nginx\n");
        assert!(!dest.join("b.yml").exists());
        assert_eq!(fixture.temp_entries(), 0);
    }
}
