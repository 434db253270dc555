mod common;

use common::{dataset, host, record, settle, with_component};
use itembrowser::data::DataSet;
use itembrowser::materializer::{ListStep, ListTask, Planned, plan};
use itembrowser::{
    Browser, BrowserConfig, CatalogState, Category, ListFilter, MajorGroup, Row, TextResolver,
};
use itembrowser::builder::{BuildStart, BuildTask};

fn mixed() -> DataSet {
    dataset(
        1,
        vec![
            record("Trail Mix"),
            record("Napberry"),
            record("Shelf Fungus"),
            record("Kingberry Purple"),
            record("Granola Bar"),
            record("Clusterberry Red"),
            record("Compass"),
            with_component(record("Zorblax Widget"), "Action_Consume"),
        ],
    )
}

fn built(set: &DataSet) -> CatalogState {
    let host = host(set);
    let mut state = CatalogState::new(TextResolver::embedded(), false);
    if let BuildStart::Started(mut task) = BuildTask::start(&mut state, &host, 100) {
        task.step(&mut state, &host);
    }
    assert!(state.is_ready());
    state
}

fn stable(state: &CatalogState, planned: &[Planned]) -> Vec<String> {
    planned
        .iter()
        .map(|p| match p {
            Planned::Header(c) => format!("# {:?}", c),
            Planned::Entry(i) => state.entries()[*i].stable_name.clone(),
        })
        .collect()
}

#[test]
fn groups_follow_category_priority_then_discovery_order() {
    let set = mixed();
    let state = built(&set);
    let planned = plan(state.entries(), &ListFilter::default());
    assert_eq!(
        stable(&state, &planned),
        vec![
            "# NaturalFood",
            "Napberry",
            "Kingberry Purple",
            "Clusterberry Red",
            "# PackagedFood",
            "Trail Mix",
            "Granola Bar",
            "# Mushroom",
            "Shelf Fungus",
            "# Consumable",
            "Zorblax Widget",
        ]
    );
}

#[test]
fn sub_category_is_alphabetical() {
    let set = mixed();
    let state = built(&set);
    let filter = ListFilter {
        category: Some(Category::NaturalFood),
        ..Default::default()
    };
    let planned = plan(state.entries(), &filter);
    assert_eq!(
        stable(&state, &planned),
        vec!["Clusterberry Red", "Kingberry Purple", "Napberry"]
    );
}

#[test]
fn query_is_case_insensitive_substring() {
    let set = mixed();
    let state = built(&set);
    let filter = ListFilter {
        query: "  BERRY ".to_string(),
        ..Default::default()
    };
    let planned = plan(state.entries(), &filter);
    assert_eq!(
        stable(&state, &planned),
        vec!["# NaturalFood", "Napberry", "Kingberry Purple", "Clusterberry Red"]
    );

    let filter = ListFilter {
        query: "compass".to_string(),
        group: MajorGroup::Food,
        category: None,
    };
    assert!(plan(state.entries(), &filter).is_empty());
}

#[test]
fn emission_is_budgeted() {
    let set = mixed();
    let host = host(&set);
    let mut state = built(&set);
    let mut task = ListTask::start(&mut state, &ListFilter::default(), 3);
    let total = task.planned().len();

    let mut rows = Vec::new();
    let mut steps = 0;
    loop {
        let before = rows.len();
        let step = task.step(&mut state, &host, &mut rows);
        assert!(rows.len() - before <= 3);
        steps += 1;
        if step == ListStep::Finished {
            break;
        }
    }
    assert_eq!(rows.len(), total);
    assert_eq!(steps, total.div_ceil(3));
    assert_eq!(rows[0], Row::Header { category: Category::NaturalFood });
}

#[test]
fn new_emission_cancels_the_old_one() {
    let set = mixed();
    let host = host(&set);
    let mut state = built(&set);
    let mut old = ListTask::start(&mut state, &ListFilter::default(), 2);
    let mut rows = Vec::new();
    old.step(&mut state, &host, &mut rows);
    assert_eq!(rows.len(), 2);

    let mut new = ListTask::start(&mut state, &ListFilter::default(), 2);
    assert!(new.token().value() > old.token().value());
    assert_eq!(old.step(&mut state, &host, &mut rows), ListStep::Cancelled);
    assert_eq!(rows.len(), 2);
    assert_eq!(new.step(&mut state, &host, &mut rows), ListStep::Continue);
}

#[test]
fn empty_result_is_a_single_placeholder() {
    let set = mixed();
    let host = host(&set);
    let mut state = built(&set);
    let filter = ListFilter {
        query: "nothing matches this".to_string(),
        ..Default::default()
    };
    let mut task = ListTask::start(&mut state, &filter, 10);
    let mut rows = Vec::new();
    assert_eq!(task.step(&mut state, &host, &mut rows), ListStep::Finished);
    assert_eq!(rows, vec![Row::NoResults]);
}

#[test]
fn browser_filter_changes_restart_the_list() {
    let set = mixed();
    let host = host(&set);
    let mut browser = Browser::new(BrowserConfig {
        list_batch: 2,
        prewarm_icons: false,
        ..Default::default()
    });
    browser.open();
    settle(&mut browser, &host);

    browser.set_category(Some(Category::MiscEquipment));
    assert_eq!(browser.filter().group, MajorGroup::Equipment);
    assert!(browser.rows().is_empty());
    assert!(browser.is_listing());
    settle(&mut browser, &host);
    match browser.rows() {
        [Row::Entry(e)] => assert_eq!(e.stable_name, "Compass"),
        other => panic!("unexpected rows {:?}", other),
    }

    browser.set_group(MajorGroup::Food);
    assert_eq!(browser.filter().category, None);
    browser.set_query("shelf");
    settle(&mut browser, &host);
    assert_eq!(browser.rows().len(), 2);
    assert_eq!(browser.rows()[0], Row::Header { category: Category::Mushroom });
}

#[test]
fn closing_cancels_emission() {
    let set = mixed();
    let host = host(&set);
    let mut browser = Browser::new(BrowserConfig {
        build_batch: 100,
        list_batch: 1,
        prewarm_icons: false,
        ..Default::default()
    });
    browser.open();
    browser.tick(&host);
    browser.tick(&host);
    assert!(browser.is_listing());
    let emitted = browser.rows().len();

    browser.close();
    assert!(!browser.is_listing());
    browser.tick(&host);
    assert_eq!(browser.rows().len(), emitted);
}
