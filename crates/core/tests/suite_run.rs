//! Orchestration tests against the in-memory fixture engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pogo::engine::{FixtureEngine, FixturePage};
use pogo::{
	Locator, NavigateOptions, Outcome, PogoError, Session, SessionConfig, SessionFactory, Suite, check,
};

struct FixtureFactory {
	build: Box<dyn Fn() -> FixtureEngine + Send + Sync>,
	created: AtomicUsize,
}

impl FixtureFactory {
	fn new(build: impl Fn() -> FixtureEngine + Send + Sync + 'static) -> Self {
		Self {
			build: Box::new(build),
			created: AtomicUsize::new(0),
		}
	}

	fn sessions_created(&self) -> usize {
		self.created.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl SessionFactory for FixtureFactory {
	async fn create(&self) -> pogo::Result<Session> {
		self.created.fetch_add(1, Ordering::SeqCst);
		Ok(Session::open(Box::new((self.build)()), SessionConfig::default()))
	}
}

fn react_app_engine() -> FixtureEngine {
	FixtureEngine::new()
		.with_page(
			"http://localhost:3000/",
			FixturePage::new("React App")
				.with_element("a.App-link", "Learn React")
				.with_element(".App-intro", "Edit src/App.js and save to reload."),
		)
		.with_page("http://localhost:3000/about", FixturePage::new("About"))
		.with_unreachable("http://unreachable.local/")
}

#[tokio::test]
async fn react_app_suite_passes() {
	let factory = FixtureFactory::new(react_app_engine);

	let mut suite = Suite::new("React App");
	suite.before_each(|session: &mut Session| {
		Box::pin(async move {
			session.navigate("http://localhost:3000/", NavigateOptions::default()).await
		})
	});
	suite.test("should be titled 'React App'", |session: &mut Session| {
		Box::pin(async move {
			let title = session.title().await?;
			check::eq("document title", title.as_str(), "React App")
		})
	});
	suite.test("should show the correct link", |session: &mut Session| {
		Box::pin(async move {
			let text = session.resolve_text(&Locator::css("a.App-link")).await?;
			check::eq("link text", text.as_str(), "Learn React")
		})
	});
	suite.test("should show the correct intro", |session: &mut Session| {
		Box::pin(async move {
			let text = session.resolve_text(&Locator::css(".App-intro")).await?;
			check::eq("intro text", text.as_str(), "Edit src/App.js and save to reload.")
		})
	});

	let report = suite.run(&factory).await.unwrap();

	assert!(report.passed());
	assert_eq!(report.results.len(), 3);
	// one fresh session per case, none shared
	assert_eq!(factory.sessions_created(), 3);
	let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
	assert_eq!(
		names,
		[
			"should be titled 'React App'",
			"should show the correct link",
			"should show the correct intro",
		]
	);
}

#[tokio::test]
async fn failed_assertion_is_failed_not_errored() {
	let factory = FixtureFactory::new(react_app_engine);

	let mut suite = Suite::new("React App");
	suite.test("wrong title", |session: &mut Session| {
		Box::pin(async move {
			session.navigate("http://localhost:3000/", NavigateOptions::default()).await?;
			let title = session.title().await?;
			check::eq("document title", title.as_str(), "Vue App")
		})
	});

	let report = suite.run(&factory).await.unwrap();
	assert_eq!(report.results[0].outcome, Outcome::Failed);
	assert!(report.results[0].message.as_deref().unwrap().contains("Vue App"));
}

#[tokio::test]
async fn failing_before_each_errors_every_case_and_skips_bodies() {
	let factory = FixtureFactory::new(react_app_engine);
	let bodies_run = Arc::new(AtomicUsize::new(0));

	let mut suite = Suite::new("React App");
	suite.before_each(|session: &mut Session| {
		Box::pin(async move {
			// unknown fixture page; every hook invocation fails
			session.navigate("http://missing.local/", NavigateOptions::default()).await
		})
	});
	for name in ["first", "second", "third"] {
		let bodies_run = Arc::clone(&bodies_run);
		suite.test(name, move |_session: &mut Session| {
			let bodies_run = Arc::clone(&bodies_run);
			Box::pin(async move {
				bodies_run.fetch_add(1, Ordering::SeqCst);
				Ok(())
			})
		});
	}

	let report = suite.run(&factory).await.unwrap();

	assert_eq!(report.results.len(), 3);
	for result in &report.results {
		assert_eq!(result.outcome, Outcome::Errored);
		assert!(result.message.as_deref().unwrap().contains("beforeEach hook failed"));
	}
	assert_eq!(bodies_run.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn title_reflects_latest_navigation() {
	let factory = FixtureFactory::new(react_app_engine);

	let mut suite = Suite::new("ordering");
	suite.test("title follows navigation", |session: &mut Session| {
		Box::pin(async move {
			session.navigate("http://localhost:3000/", NavigateOptions::default()).await?;
			session.navigate("http://localhost:3000/about", NavigateOptions::default()).await?;
			let title = session.title().await?;
			check::eq("document title", title.as_str(), "About")
		})
	});

	let report = suite.run(&factory).await.unwrap();
	assert!(report.passed());
}

#[tokio::test(start_paused = true)]
async fn unreachable_navigation_times_out_and_keeps_url() {
	let mut session = Session::open(Box::new(react_app_engine()), SessionConfig::default());
	session.navigate("http://localhost:3000/", NavigateOptions::default()).await.unwrap();

	let options = NavigateOptions {
		timeout: Some(Duration::from_millis(100)),
		..Default::default()
	};
	let err = session.navigate("http://unreachable.local/", options).await.unwrap_err();

	match err {
		PogoError::NavigationTimeout { url, elapsed } => {
			assert_eq!(url, "http://unreachable.local/");
			assert!(elapsed >= Duration::from_millis(100));
			assert!(elapsed <= Duration::from_millis(150));
		}
		other => panic!("expected NavigationTimeout, got {other:?}"),
	}
	assert_eq!(session.current_url(), Some("http://localhost:3000/"));

	session.close().await.unwrap();
}

#[tokio::test]
async fn suite_runs_only_once() {
	let factory = FixtureFactory::new(react_app_engine);

	let mut suite = Suite::new("once");
	suite.test("noop", |_session: &mut Session| Box::pin(async { Ok(()) }));

	suite.run(&factory).await.unwrap();
	let err = suite.run(&factory).await.unwrap_err();
	assert!(matches!(err, PogoError::SuiteCompleted { .. }));
}

#[tokio::test]
async fn cancellation_errors_remaining_cases_without_sessions() {
	let factory = FixtureFactory::new(react_app_engine);

	let mut suite = Suite::new("cancelled");
	let token = suite.cancellation_token();

	suite.test("cancels the run", move |_session: &mut Session| {
		let token = token.clone();
		Box::pin(async move {
			token.cancel();
			Ok(())
		})
	});
	suite.test("never runs", |session: &mut Session| {
		Box::pin(async move {
			session.navigate("http://localhost:3000/", NavigateOptions::default()).await
		})
	});
	suite.test("never runs either", |_session: &mut Session| Box::pin(async { Ok(()) }));

	let report = suite.run(&factory).await.unwrap();

	assert_eq!(report.results[0].outcome, Outcome::Passed);
	assert_eq!(report.results[1].outcome, Outcome::Errored);
	assert_eq!(report.results[2].outcome, Outcome::Errored);
	assert!(report.results[1].message.as_deref().unwrap().contains("cancelled"));
	// only the first case ever got a session
	assert_eq!(factory.sessions_created(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_in_flight_navigation() {
	let token = tokio_util::sync::CancellationToken::new();
	let mut session =
		Session::open(Box::new(react_app_engine()), SessionConfig::default()).with_cancellation(token.clone());

	let cancel = token.clone();
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(50)).await;
		cancel.cancel();
	});

	let err = session
		.navigate("http://unreachable.local/", NavigateOptions::default())
		.await
		.unwrap_err();
	assert!(matches!(err, PogoError::Cancelled(_)));
}
