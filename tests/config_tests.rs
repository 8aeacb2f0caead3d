// Tests for configuration validation, loading and saving.
use chrono::NaiveDate;
use taskcal::config::{Config, ConfigError, Style, ViewMode};
use taskcal::context::{AppContext, TestContext};

#[test]
fn test_defaults_are_valid() {
    let settings = Config::default().validate().unwrap();

    assert_eq!(settings.pages, "");
    assert_eq!(settings.view, ViewMode::Month);
    assert_eq!(settings.first_day_of_week, 1);
    assert_eq!(settings.style, Style::default());
    assert_eq!(settings.style.to_string(), "style1");
    assert_eq!(
        settings.daily_note_format.as_ref().map(|f| f.as_str()),
        Some("YYYY-MM-DD")
    );
    assert_eq!(settings.start_position, None);
}

#[test]
fn test_missing_required_settings() {
    let no_pages = Config {
        pages: None,
        ..Config::default()
    };
    assert_eq!(no_pages.validate().unwrap_err(), ConfigError::MissingPages);

    let no_view = Config {
        view: Some("  ".to_string()),
        ..Config::default()
    };
    assert_eq!(no_view.validate().unwrap_err(), ConfigError::MissingView);

    let no_style = Config {
        style: None,
        ..Config::default()
    };
    assert_eq!(no_style.validate().unwrap_err(), ConfigError::MissingStyle);
}

#[test]
fn test_unknown_view_and_style() {
    let view = Config {
        view: Some("year".to_string()),
        ..Config::default()
    };
    assert_eq!(
        view.validate().unwrap_err(),
        ConfigError::UnknownView("year".to_string())
    );

    let style = Config {
        style: Some("style12".to_string()),
        ..Config::default()
    };
    let err = style.validate().unwrap_err();
    assert_eq!(err, ConfigError::UnknownStyle("style12".to_string()));
    assert!(err.to_string().contains("style11"));
}

#[test]
fn test_view_is_case_insensitive() {
    let config = Config {
        view: Some("Week".to_string()),
        ..Config::default()
    };
    assert_eq!(config.validate().unwrap().view, ViewMode::Week);
}

#[test]
fn test_first_day_of_week() {
    for (value, expected) in [("0", 0), ("6", 6), (" 3 ", 3)] {
        let config = Config {
            first_day_of_week: Some(value.to_string()),
            ..Config::default()
        };
        assert_eq!(config.validate().unwrap().first_day_of_week, expected);
    }

    for bad in ["7", "Mon", "", "12"] {
        let config = Config {
            first_day_of_week: Some(bad.to_string()),
            ..Config::default()
        };
        assert!(
            matches!(
                config.validate(),
                Err(ConfigError::InvalidFirstDayOfWeek(_))
            ),
            "'{}' should be rejected",
            bad
        );
    }
}

#[test]
fn test_start_position_depends_on_view() {
    let month = Config {
        start_position: Some("2024-06".to_string()),
        ..Config::default()
    };
    assert_eq!(
        month.validate().unwrap().start_position,
        NaiveDate::from_ymd_opt(2024, 6, 1)
    );

    let bad_month = Config {
        start_position: Some("2024-13".to_string()),
        ..Config::default()
    };
    assert_eq!(
        bad_month.validate().unwrap_err(),
        ConfigError::InvalidStartPosition {
            value: "2024-13".to_string(),
            expected: "YYYY-MM",
        }
    );

    let bad_week = Config {
        view: Some("week".to_string()),
        start_position: Some("2024-60".to_string()),
        ..Config::default()
    };
    assert!(matches!(
        bad_week.validate(),
        Err(ConfigError::InvalidStartPosition {
            expected: "YYYY-ww",
            ..
        })
    ));
}

#[test]
fn test_daily_note_format_characters() {
    let slashes = Config {
        daily_note_format: Some("YYYY/MM/DD".to_string()),
        ..Config::default()
    };
    assert_eq!(
        slashes.validate().unwrap_err(),
        ConfigError::InvalidDailyNoteFormat("YYYY/MM/DD".to_string())
    );

    let week = Config {
        daily_note_format: Some("YYYY-[W]WW".to_string()),
        ..Config::default()
    };
    assert!(week.validate().is_ok());

    let none = Config {
        daily_note_format: None,
        ..Config::default()
    };
    assert!(none.validate().unwrap().daily_note_format.is_none());
}

#[test]
fn test_global_filter_and_css() {
    let config = Config {
        global_task_filter: Some("#task".to_string()),
        css: Some(" ".to_string()),
        ..Config::default()
    };
    let settings = config.validate().unwrap();

    assert_eq!(settings.css, None);
    assert_eq!(
        settings.annotate_options().global_filter.as_deref(),
        Some("#task")
    );
}

#[test]
fn test_from_toml() {
    let config = Config::from_toml_str(
        r#"
        vault = "/home/me/Notes"
        pages = "Projects"
        view = "list"
        first_day_of_week = "0"
        style = "style4"
        "#,
    )
    .unwrap();

    assert_eq!(config.vault.as_deref(), Some("/home/me/Notes"));
    assert_eq!(config.daily_note_format, None);

    let settings = config.validate().unwrap();
    assert_eq!(settings.view, ViewMode::List);
    assert_eq!(settings.style.number(), 4);
    assert_eq!(settings.pages, "Projects");
}

#[test]
fn test_save_and_load_roundtrip() {
    let ctx = TestContext::new();
    let config = Config {
        vault: Some("/tmp/vault".to_string()),
        global_task_filter: Some("#todo".to_string()),
        ..Config::default()
    };

    config.save(&ctx).unwrap();
    assert!(ctx.get_config_file_path().unwrap().exists());

    let loaded = Config::load(&ctx).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_config_file() {
    let ctx = TestContext::new();
    let err = Config::load(&ctx).unwrap_err();
    assert!(Config::is_missing_config_error(&err));

    let read_err = Config::load_from(&ctx.root.join("nope.toml")).unwrap_err();
    assert!(Config::is_missing_config_error(&read_err));
}
