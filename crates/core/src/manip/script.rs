use super::{Manipulator, ManipulatorKind};
use crate::error::{Error, Result};
use crate::script::{ScriptContext, ScriptLoader, ScriptStage};
use crate::session::Session;
use crate::state::ScriptState;
use crate::types::ProjectRef;
use crate::xml::Element;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Runs every configured script at one stage and reports the projects
/// whose model differs afterwards
#[derive(Clone)]
struct ScriptRunner {
    stage: ScriptStage,
    loader: Arc<dyn ScriptLoader>,
}

impl ScriptRunner {
    fn run(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let locations = session.require_state::<ScriptState>()?.locations.clone();
        let before: HashMap<ProjectRef, Element> = session
            .projects()
            .iter()
            .map(|p| (p.key(), p.model().root().clone()))
            .collect();

        for location in &locations {
            let script = self.loader.load(location, session.file_io())?;
            let name = script.name().to_string();
            if !script.runs_in(self.stage) {
                info!("Ignoring script {} as invoked during stage {}", name, self.stage);
                continue;
            }

            info!("Executing script {} ({}) at stage {}", name, location, self.stage);
            let mut context = ScriptContext::new(session, self.stage);
            script.run(&mut context).map_err(|error| match error.downcast::<Error>() {
                Ok(engine) => engine,
                Err(source) => Error::Script {
                    script: name.clone(),
                    source,
                },
            })?;
        }

        Ok(session
            .projects()
            .iter()
            .filter(|p| before.get(&p.key()) != Some(p.model().root()))
            .map(|p| p.key())
            .collect())
    }
}

impl fmt::Debug for ScriptRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRunner")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

/// Runs scripts before any other manipulator
#[derive(Debug, Clone)]
pub struct InitialScriptManipulator(ScriptRunner);

impl InitialScriptManipulator {
    pub fn new(loader: Arc<dyn ScriptLoader>) -> Self {
        Self(ScriptRunner {
            stage: ScriptStage::First,
            loader,
        })
    }
}

/// Runs scripts after every other manipulator
#[derive(Debug, Clone)]
pub struct FinalScriptManipulator(ScriptRunner);

impl FinalScriptManipulator {
    pub fn new(loader: Arc<dyn ScriptLoader>) -> Self {
        Self(ScriptRunner {
            stage: ScriptStage::Last,
            loader,
        })
    }
}

fn init_state(session: &mut Session) -> Result<()> {
    let state = ScriptState::new(session.user_properties())?;
    session.set_state(state);
    Ok(())
}

impl Manipulator for InitialScriptManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::InitialScript
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        init_state(session)
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<ScriptState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        self.0.run(session)
    }
}

impl Manipulator for FinalScriptManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::FinalScript
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        init_state(session)
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<ScriptState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        self.0.run(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::{Model, Project};
    use crate::script::{RegisteredScriptLoader, Script};
    use crate::session::ManipulationRequest;
    use crate::test_support::capture_logs;
    use anyhow::{Context, bail};

    struct SetProperty;

    impl Script for SetProperty {
        fn name(&self) -> &str {
            "set-property"
        }

        fn stages(&self) -> &[ScriptStage] {
            &[ScriptStage::Last]
        }

        fn run(&self, context: &mut ScriptContext<'_>) -> anyhow::Result<()> {
            let gav = context.gav().context("no projects")?;
            let project = context.project_mut().context("no projects")?;
            project.model_mut().set_property("built.from", &gav.to_string());
            Ok(())
        }
    }

    struct Failing;

    impl Script for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(&self, _context: &mut ScriptContext<'_>) -> anyhow::Result<()> {
            bail!("boom")
        }
    }

    struct EngineFailure;

    impl Script for EngineFailure {
        fn name(&self) -> &str {
            "engine"
        }

        fn run(&self, _context: &mut ScriptContext<'_>) -> anyhow::Result<()> {
            Err(Error::Manipulation("stop here".to_string()).into())
        }
    }

    fn session_with(scripts: &str) -> Session {
        let mut session = Session::new(
            ManipulationRequest::new("pom.xml"),
            [("manipulationScripts", scripts)].into_iter().collect(),
        );
        let model = Model::parse(
            "<project><groupId>org.example</groupId><artifactId>app</artifactId><version>1.0</version></project>",
        )
        .unwrap();
        session.set_projects(vec![Project::new("pom.xml", model)]);
        session
    }

    fn loader() -> Arc<dyn ScriptLoader> {
        Arc::new(
            RegisteredScriptLoader::new()
                .with_script("set", Arc::new(SetProperty))
                .with_script("fail", Arc::new(Failing))
                .with_script("engine", Arc::new(EngineFailure)),
        )
    }

    #[test]
    fn test_stage_filtering() {
        let mut session = session_with("set");
        let initial = InitialScriptManipulator::new(loader());
        let last = FinalScriptManipulator::new(loader());
        initial.init(&mut session).unwrap();
        last.init(&mut session).unwrap();
        assert!(initial.is_enabled(&session));

        let logs = capture_logs(|| {
            assert!(initial.apply_changes(&mut session).unwrap().is_empty());
        });
        assert!(logs.contains("Ignoring script set-property as invoked during stage FIRST"));

        let changed = last.apply_changes(&mut session).unwrap();
        assert_eq!(changed, BTreeSet::from([ProjectRef::new("org.example", "app")]));
        assert_eq!(
            session.projects()[0].model().property("built.from").as_deref(),
            Some("org.example:app:1.0")
        );
    }

    #[test]
    fn test_script_errors() {
        let mut session = session_with("fail");
        let manipulator = InitialScriptManipulator::new(loader());
        manipulator.init(&mut session).unwrap();
        match manipulator.apply_changes(&mut session) {
            Err(Error::Script { script, source }) => {
                assert_eq!(script, "failing");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected {other:?}"),
        }

        let mut session = session_with("engine");
        manipulator.init(&mut session).unwrap();
        assert!(matches!(
            manipulator.apply_changes(&mut session),
            Err(Error::Manipulation(message)) if message == "stop here"
        ));
    }
}
