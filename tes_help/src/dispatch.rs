//! Routes a help query to the matchers its filter selects.

use crate::cells::CellIndexCache;
use crate::form_type::FormType;
use crate::load_order::LoadOrder;
use crate::matchers::{cells, commands, forms, globals, settings};
use crate::model::GameData;
use crate::resolver::EditorIdResolver;
use crate::sink::ResultSink;
use crate::text::MatchString;

pub const OTHER_FORMS_HEADER: &str = "----OTHER FORMS-------------------------";

pub const BANNER: [&str; 3] = [
    "usage: help <matchstring> <filter> <form type>",
    "filters: 0-all 1-functions, 2-settings, 3-globals, 4-other forms",
    "form type is 4 characters and is ignored unless the filter is 4.",
];

/// Which sources a query searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    All,
    Commands,
    Settings,
    Globals,
    OtherForms,
}

impl Filter {
    /// Console filter code, `0` through `4`.
    pub fn from_code(code: i64) -> Option<Filter> {
        match code {
            0 => Some(Filter::All),
            1 => Some(Filter::Commands),
            2 => Some(Filter::Settings),
            3 => Some(Filter::Globals),
            4 => Some(Filter::OtherForms),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Filter::All => 0,
            Filter::Commands => 1,
            Filter::Settings => 2,
            Filter::Globals => 3,
            Filter::OtherForms => 4,
        }
    }
}

/// A decoded `help` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpQuery {
    pub match_string: MatchString,
    /// `None` for a filter code outside `0..=4`.
    pub filter: Option<Filter>,
    /// Only consulted by [`Filter::OtherForms`].
    pub form_type: Option<FormType>,
}

impl HelpQuery {
    pub fn new(match_string: &str, filter: Filter) -> Self {
        HelpQuery {
            match_string: MatchString::new(match_string),
            filter: Some(filter),
            form_type: None,
        }
    }

    pub fn with_form_type(mut self, form_type: Option<FormType>) -> Self {
        self.form_type = form_type;
        self
    }

    /// Build from raw console arguments: a filter code and an optional
    /// four-character type code.
    pub fn from_console(match_string: &str, filter_code: i64, form_type: Option<&str>) -> Self {
        HelpQuery {
            match_string: MatchString::new(match_string),
            filter: Filter::from_code(filter_code),
            form_type: form_type.and_then(FormType::parse),
        }
    }
}

/// Borrowed view of everything a query reads.
pub struct QueryDispatcher<'a> {
    data: &'a dyn GameData,
    resolver: &'a EditorIdResolver,
    cells: &'a CellIndexCache,
    load_order: &'a LoadOrder,
}

impl<'a> QueryDispatcher<'a> {
    pub fn new(
        data: &'a dyn GameData,
        resolver: &'a EditorIdResolver,
        cells: &'a CellIndexCache,
        load_order: &'a LoadOrder,
    ) -> Self {
        QueryDispatcher {
            data,
            resolver,
            cells,
            load_order,
        }
    }

    /// Run `query`, writing every section it selects and then the banner.
    pub fn run(&self, query: &HelpQuery, sink: &mut dyn ResultSink) {
        if !query.match_string.is_empty() {
            match query.filter {
                Some(Filter::All) => self.print_all(&query.match_string, sink),
                Some(Filter::Commands) => self.print_commands(&query.match_string, sink),
                Some(Filter::Settings) => self.print_settings(&query.match_string, sink),
                Some(Filter::Globals) => self.print_globals(&query.match_string, sink),
                Some(Filter::OtherForms) => {
                    self.print_other_forms(&query.match_string, query.form_type, sink)
                }
                None => {}
            }
        }
        print_banner(sink);
    }

    fn print_all(&self, query: &MatchString, sink: &mut dyn ResultSink) {
        self.print_commands(query, sink);
        self.print_settings(query, sink);
        self.print_globals(query, sink);
        self.print_other_forms(query, None, sink);
    }

    fn print_commands(&self, query: &MatchString, sink: &mut dyn ResultSink) {
        commands::print(self.data, query, sink);
    }

    fn print_settings(&self, query: &MatchString, sink: &mut dyn ResultSink) {
        settings::print(self.data, query, sink);
    }

    fn print_globals(&self, query: &MatchString, sink: &mut dyn ResultSink) {
        globals::print(self.data, query, sink);
    }

    fn print_other_forms(
        &self,
        query: &MatchString,
        form_type: Option<FormType>,
        sink: &mut dyn ResultSink,
    ) {
        sink.emit(OTHER_FORMS_HEADER);
        match form_type {
            None => {
                forms::print(self.data.all_forms(), query, self.resolver, sink);
                self.print_cells(query, sink);
            }
            Some(FormType::Cell) => {
                let cells = self
                    .data
                    .all_forms()
                    .filter(|form| form.form_type == FormType::Cell);
                forms::print(cells, query, self.resolver, sink);
                self.print_cells(query, sink);
            }
            // Globals have their own filter.
            Some(FormType::Global) => {}
            Some(other) => {
                forms::print(self.data.forms_of_type(other), query, self.resolver, sink);
            }
        }
    }

    fn print_cells(&self, query: &MatchString, sink: &mut dyn ResultSink) {
        let index = self.cells.get_or_build(self.load_order);
        cells::print(&index, query, sink);
    }
}

pub fn print_banner(sink: &mut dyn ResultSink) {
    for line in BANNER {
        sink.emit(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::cells::EXTERIOR_CELLS_HEADER;
    use crate::matchers::commands::{CONSOLE_COMMANDS_HEADER, SCRIPT_FUNCTIONS_HEADER};
    use crate::matchers::globals::GLOBALS_HEADER;
    use crate::matchers::settings::{GAME_SETTINGS_HEADER, INI_SETTINGS_HEADER};
    use crate::sink::MemorySink;
    use crate::snapshot::GameSnapshot;
    use tempfile::{tempdir, TempDir};
    use tes_formats::testing::PluginBuilder;

    const SNAPSHOT: &str = r#"{
        "console_commands": [
            { "name": "ToggleCollision", "alias": "TCL", "help": "Toggles collision" },
            { "name": "CenterOnCell", "alias": "COC", "help": "Moves the player to a cell" }
        ],
        "script_functions": [
            { "name": "GetActorValue", "alias": "GAV", "help": "gets a value" }
        ],
        "game_settings": [ { "name": "fJumpHeightMin", "value": 76.0 } ],
        "ini_settings": [ { "name": "fDefaultFOV:Display", "value": 65.0 } ],
        "globals": [ { "editor_id": "GameDaysPassed", "value": 12.345 } ],
        "forms": [
            { "form_id": "00012EB7", "type": "WEAP", "editor_id": "IronSword", "name": "Iron Sword" },
            { "form_id": "00013989", "type": "ARMO", "editor_id": "MarketArmor" },
            { "form_id": "00000D63", "type": "CELL", "editor_id": "MarketInterior" },
            { "form_id": "00000D62", "type": "CELL", "editor_id": "MarketStreet", "exterior": true },
            { "form_id": "00000039", "type": "GLOB", "editor_id": "MarketGlobal" }
        ]
    }"#;

    struct Fixture {
        _dir: TempDir,
        snapshot: GameSnapshot,
        load_order: LoadOrder,
        resolver: EditorIdResolver,
        cache: CellIndexCache,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            PluginBuilder::new()
                .cell(0x0D62, Some("Tundra"), Some(0))
                .write_to(dir.path().join("Skyrim.esm"))
                .unwrap();
            PluginBuilder::new()
                .master("Skyrim.esm")
                .cell(0x0100_0801, Some("WhiterunMarket"), Some(0))
                .cell(0x0100_0802, Some("MarketCellar"), Some(tes_formats::CELL_FLAG_INTERIOR))
                .write_to(dir.path().join("Market.esp"))
                .unwrap();
            let names = vec!["Skyrim.esm".to_string(), "Market.esp".to_string()];
            let load_order = LoadOrder::from_names(dir.path(), &names);
            Fixture {
                _dir: dir,
                snapshot: GameSnapshot::from_json_str(SNAPSHOT).unwrap(),
                load_order,
                resolver: EditorIdResolver::builtin(),
                cache: CellIndexCache::new(),
            }
        }

        fn run(&self, query: &HelpQuery) -> Vec<String> {
            let dispatcher =
                QueryDispatcher::new(&self.snapshot, &self.resolver, &self.cache, &self.load_order);
            let mut sink = MemorySink::new();
            dispatcher.run(query, &mut sink);
            sink.into_lines()
        }
    }

    fn with_banner(lines: &[&str]) -> Vec<String> {
        lines
            .iter()
            .chain(BANNER.iter())
            .map(|line| line.to_string())
            .collect()
    }

    #[test]
    fn filter_codes_map_to_variants() {
        for filter in [
            Filter::All,
            Filter::Commands,
            Filter::Settings,
            Filter::Globals,
            Filter::OtherForms,
        ] {
            assert_eq!(Filter::from_code(filter.code()), Some(filter));
        }
        assert_eq!(Filter::from_code(5), None);
        assert_eq!(Filter::from_code(-1), None);
    }

    #[test]
    fn empty_query_prints_only_the_banner() {
        let fixture = Fixture::new();
        for code in 0..=4 {
            let query = HelpQuery::from_console("", code, None);
            assert_eq!(fixture.run(&query), with_banner(&[]));
        }
        assert!(!fixture.cache.is_built());
    }

    #[test]
    fn unknown_filter_prints_only_the_banner() {
        let fixture = Fixture::new();
        let query = HelpQuery::from_console("market", 9, None);
        assert_eq!(fixture.run(&query), with_banner(&[]));
    }

    #[test]
    fn commands_filter() {
        let fixture = Fixture::new();
        let query = HelpQuery::new("actor", Filter::Commands);
        assert_eq!(
            fixture.run(&query),
            with_banner(&[
                CONSOLE_COMMANDS_HEADER,
                SCRIPT_FUNCTIONS_HEADER,
                "GetActorValue (GAV) > gets a value",
            ])
        );
    }

    #[test]
    fn settings_filter() {
        let fixture = Fixture::new();
        let query = HelpQuery::new("f", Filter::Settings);
        assert_eq!(
            fixture.run(&query),
            with_banner(&[
                GAME_SETTINGS_HEADER,
                "fJumpHeightMin = 76.00",
                INI_SETTINGS_HEADER,
                "fDefaultFOV:Display = 65.00",
            ])
        );
    }

    #[test]
    fn globals_filter() {
        let fixture = Fixture::new();
        let query = HelpQuery::new("gamedays", Filter::Globals);
        assert_eq!(
            fixture.run(&query),
            with_banner(&[GLOBALS_HEADER, "GameDaysPassed = 12.35"])
        );
    }

    #[test]
    fn other_forms_cell_type_lists_interiors_then_scanned_exteriors() {
        let fixture = Fixture::new();
        let query =
            HelpQuery::new("market", Filter::OtherForms).with_form_type(Some(FormType::Cell));
        assert_eq!(
            fixture.run(&query),
            with_banner(&[
                OTHER_FORMS_HEADER,
                "CELL: MarketInterior (00000D63)",
                EXTERIOR_CELLS_HEADER,
                "Market.esp CELL: WhiterunMarket",
            ])
        );
    }

    #[test]
    fn other_forms_without_type_covers_every_form() {
        let fixture = Fixture::new();
        let query = HelpQuery::new("market", Filter::OtherForms);
        assert_eq!(
            fixture.run(&query),
            with_banner(&[
                OTHER_FORMS_HEADER,
                "ARMO: MarketArmor (00013989)",
                "CELL: MarketInterior (00000D63)",
                EXTERIOR_CELLS_HEADER,
                "Market.esp CELL: WhiterunMarket",
            ])
        );
    }

    #[test]
    fn other_forms_with_concrete_type_skips_cells() {
        let fixture = Fixture::new();
        let query = HelpQuery::from_console("market", 4, Some("armo"));
        assert_eq!(
            fixture.run(&query),
            with_banner(&[OTHER_FORMS_HEADER, "ARMO: MarketArmor (00013989)"])
        );
        assert!(!fixture.cache.is_built());
    }

    #[test]
    fn other_forms_global_type_is_a_no_op() {
        let fixture = Fixture::new();
        let query = HelpQuery::from_console("market", 4, Some("GLOB"));
        assert_eq!(fixture.run(&query), with_banner(&[OTHER_FORMS_HEADER]));
    }

    #[test]
    fn all_runs_every_section_in_order() {
        let fixture = Fixture::new();
        let query = HelpQuery::from_console("market", 0, Some("ARMO"));
        assert_eq!(
            fixture.run(&query),
            with_banner(&[
                CONSOLE_COMMANDS_HEADER,
                SCRIPT_FUNCTIONS_HEADER,
                GAME_SETTINGS_HEADER,
                INI_SETTINGS_HEADER,
                GLOBALS_HEADER,
                OTHER_FORMS_HEADER,
                "ARMO: MarketArmor (00013989)",
                "CELL: MarketInterior (00000D63)",
                EXTERIOR_CELLS_HEADER,
                "Market.esp CELL: WhiterunMarket",
            ])
        );
    }

    #[test]
    fn query_case_does_not_change_output() {
        let fixture = Fixture::new();
        let lower = fixture.run(&HelpQuery::new("market", Filter::All));
        let upper = fixture.run(&HelpQuery::new("MARKET", Filter::All));
        let mixed = fixture.run(&HelpQuery::new("mArKeT", Filter::All));
        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
    }

    #[test]
    fn repeated_queries_scan_once() {
        let fixture = Fixture::new();
        let query = HelpQuery::new("a", Filter::All);
        let first = fixture.run(&query);
        let second = fixture.run(&query);
        assert_eq!(first, second);
        assert_eq!(fixture.cache.builds(), 1);

        fixture.cache.invalidate();
        fixture.run(&query);
        assert_eq!(fixture.cache.builds(), 2);
    }
}
