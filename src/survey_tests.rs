//! Unit tests for the survey service - sessions, outcomes and export.

#[cfg(test)]
mod survey_tests {
    use crate::chart::Trend;
    use crate::config::AppConfig;
    use crate::error::SurveyError;
    use crate::recorder::FixedDraw;
    use crate::scenario::ScenarioProfile;
    use crate::session::Choice;
    use crate::survey::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;

    fn temp_log_path() -> PathBuf {
        std::env::temp_dir().join(format!("survey-service-{}.csv", Uuid::new_v4()))
    }

    fn service(profile: ScenarioProfile, draws: Vec<f64>) -> (SurveyService, PathBuf) {
        let path = temp_log_path();
        let config = AppConfig {
            log_path: path.clone(),
            profile,
            ..AppConfig::default()
        };
        (SurveyService::with_draw(&config, Box::new(FixedDraw::new(draws))), path)
    }

    fn play(service: &SurveyService, id: Uuid, choices: &[Choice]) -> SessionView {
        let mut view = service.view(id).unwrap();
        for &c in choices {
            view = service.submit(id, c).unwrap();
        }
        view
    }

    const SCRIPT: [Choice; 4] = [Choice::Buy, Choice::Hold, Choice::Sell, Choice::Buy];

    #[test]
    fn test_fresh_session_view() {
        let (service, _) = service(ScenarioProfile::Classroom, vec![0.3]);
        let id = service.start_session();
        let view = service.view(id).unwrap();

        assert_eq!(view.stage, 0);
        assert_eq!(view.total_stages, 4);
        assert!(!view.terminal);
        assert!(view.narrative.unwrap().starts_with("You bought a stock at Rs.125"));
        let prices: Vec<u32> = view.chart.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![125, 100]);
        assert!(view.outcome.is_none());
        assert!(view.results.is_empty());
    }

    #[test]
    fn test_chart_grows_with_each_stage() {
        let (service, _) = service(ScenarioProfile::Classroom, vec![0.3]);
        let id = service.start_session();

        let view = play(&service, id, &SCRIPT[..2]);
        assert_eq!(view.stage, 2);
        assert_eq!(view.chart.len(), 4);
        assert_eq!(view.chart[3].trend, Trend::Increase);
    }

    #[test]
    fn test_complete_session_classroom() {
        let (service, path) = service(ScenarioProfile::Classroom, vec![0.3]);
        let id = service.start_session();

        let view = play(&service, id, &SCRIPT);

        assert!(view.terminal);
        assert!(view.narrative.is_none());
        let outcome = view.outcome.expect("outcome after last stage");
        assert_eq!(outcome.final_price, 120);
        let prices: Vec<u32> = view.chart.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![125, 100, 90, 100, 110, 120]);

        assert_eq!(view.results.len(), 4);
        assert_eq!(
            view.results[0],
            ResultRow {
                label: "1st Stock Move".to_string(),
                previous_move: "125 to 100".to_string(),
                up_forecast: "110,.45".to_string(),
                down_forecast: "90,.55".to_string(),
                action: Choice::Buy,
            }
        );
        assert_eq!(view.results[3].label, "4th Stock Move");
        assert_eq!(view.results[3].up_forecast, "120,.55");

        assert_eq!(service.recorder().read_all().unwrap().len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_complete_session_self_paced() {
        let (service, path) = service(ScenarioProfile::SelfPaced, vec![0.3]);
        let id = service.start_session();

        let view = play(&service, id, &SCRIPT);

        assert_eq!(view.outcome.unwrap().final_price, 115);
        assert!(view.results.is_empty());
        assert!(!service.export_enabled());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rerender_and_extra_choice_do_not_log_twice() {
        let (service, path) = service(ScenarioProfile::Classroom, vec![0.3, 0.9]);
        let id = service.start_session();
        let done = play(&service, id, &SCRIPT);

        let again = service.view(id).unwrap();
        let ignored = service.submit(id, Choice::Sell).unwrap();

        assert_eq!(again.outcome, done.outcome);
        assert_eq!(ignored.choices, SCRIPT.to_vec());
        assert_eq!(service.recorder().read_all().unwrap().len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_reset_then_play_again() {
        let (service, path) = service(ScenarioProfile::Classroom, vec![0.3, 0.9]);
        let id = service.start_session();
        play(&service, id, &SCRIPT);

        let view = service.reset(id).unwrap();
        assert_eq!(view.stage, 0);
        assert!(view.choices.is_empty());
        assert!(view.outcome.is_none());

        let view = play(&service, id, &[Choice::Sell; 4]);
        assert_eq!(view.outcome.unwrap().final_price, 100);

        let rows = service.recorder().read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].final_price, 120);
        assert_eq!(rows[1].choices, vec![Choice::Sell; 4]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_sessions_are_isolated() {
        let (service, path) = service(ScenarioProfile::Classroom, vec![0.3]);
        let a = service.start_session();
        let b = service.start_session();

        service.submit(a, Choice::Buy).unwrap();
        assert_eq!(service.view(a).unwrap().stage, 1);
        assert_eq!(service.view(b).unwrap().stage, 0);
        assert_eq!(service.session_count(), 2);
        std::fs::remove_file(&path).ok();
    }

    // ============= Session Eviction Tests =============

    #[test]
    fn test_idle_sessions_evicted_on_start() {
        let config = AppConfig {
            log_path: temp_log_path(),
            session_idle_secs: 0,
            ..AppConfig::default()
        };
        let service = SurveyService::with_draw(&config, Box::new(FixedDraw::new(vec![0.3])));

        let mut last = service.start_session();
        for _ in 0..50 {
            last = service.start_session();
        }

        // Every earlier session was idle past the zero limit when the next one started
        assert_eq!(service.session_count(), 1);
        assert!(service.view(last).is_ok());
    }

    #[test]
    fn test_active_sessions_survive_eviction() {
        let (service, _) = service(ScenarioProfile::Classroom, vec![0.3]);
        let a = service.start_session();
        service.submit(a, Choice::Buy).unwrap();
        service.start_session();

        assert_eq!(service.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(service.session_count(), 2);
        assert_eq!(service.view(a).unwrap().stage, 1);
    }

    #[test]
    fn test_evict_idle_drops_stale_sessions() {
        let (service, _) = service(ScenarioProfile::Classroom, vec![0.3]);
        let a = service.start_session();
        service.start_session();

        assert_eq!(service.evict_idle(Duration::ZERO), 2);
        assert_eq!(service.session_count(), 0);
        assert!(matches!(service.view(a), Err(SurveyError::SessionNotFound(_))));
    }

    // ============= Unwritable Log Tests =============

    #[test]
    fn test_unwritable_log_retries_on_next_view() {
        let (service, path) = service(ScenarioProfile::Classroom, vec![0.3]);
        // A directory where the log file should be makes every append fail
        std::fs::create_dir_all(&path).unwrap();
        let id = service.start_session();

        for &c in &SCRIPT[..3] {
            service.submit(id, c).unwrap();
        }
        let err = service.submit(id, SCRIPT[3]).unwrap_err();
        assert!(matches!(err, SurveyError::Io(_)));
        assert!(matches!(service.view(id), Err(SurveyError::Io(_))));

        std::fs::remove_dir_all(&path).unwrap();
        let view = service.view(id).unwrap();

        assert!(view.terminal);
        assert_eq!(view.choices, SCRIPT.to_vec());
        assert_eq!(view.outcome.unwrap().final_price, 120);
        let rows = service.recorder().read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].choices, SCRIPT.to_vec());

        // Further views reuse the stored outcome
        service.view(id).unwrap();
        assert_eq!(service.recorder().read_all().unwrap().len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unknown_session() {
        let (service, _) = service(ScenarioProfile::Classroom, vec![0.3]);
        let id = Uuid::new_v4();

        assert!(matches!(service.view(id), Err(SurveyError::SessionNotFound(x)) if x == id));
        assert!(service.submit(id, Choice::Buy).is_err());
        assert!(service.reset(id).is_err());
    }

    // ============= Export Tests =============

    #[test]
    fn test_export_correct_secret() {
        let (service, path) = service(ScenarioProfile::Classroom, vec![0.3]);
        let id = service.start_session();
        play(&service, id, &SCRIPT);

        let bytes = service.export("mysecret123").expect("export granted");
        assert_eq!(bytes, std::fs::read(&path).unwrap());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_export_wrong_secret() {
        let (service, path) = service(ScenarioProfile::Classroom, vec![0.3]);
        let id = service.start_session();
        play(&service, id, &SCRIPT);

        assert!(service.export("mysecret").is_none());
        assert!(service.export("").is_none());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_export_missing_file() {
        let (service, _) = service(ScenarioProfile::Classroom, vec![0.3]);
        assert!(service.export("mysecret123").is_none());
    }

    #[test]
    fn test_export_disabled_for_self_paced() {
        let (service, path) = service(ScenarioProfile::SelfPaced, vec![0.3]);
        let id = service.start_session();
        play(&service, id, &SCRIPT);

        assert!(service.export("mysecret123").is_none());
        std::fs::remove_file(&path).ok();
    }
}
