macro_rules! assert_miette_snapshot {
    ($diag:expr) => {{
        use insta::{assert_snapshot, with_settings};
        use miette::{GraphicalReportHandler, GraphicalTheme};

        let error: Box<crate::BiomassError> = $diag.unwrap_err().into();
        let mut out = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_width(80)
            .render_report(&mut out, &*error)
            .unwrap();
        with_settings!({
            description => stringify!($diag)
        }, {
            assert_snapshot!(out);
        });
    }};
}

pub(crate) use assert_miette_snapshot;
