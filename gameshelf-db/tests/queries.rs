use gameshelf_catalog::types::*;
use gameshelf_db::*;

fn new_game(title: &str, date: &str, price: Option<f64>, rating: Option<f64>) -> NewGame {
    NewGame {
        title: title.to_string(),
        release_date: date.to_string(),
        price,
        content: None,
        developer: Some("Valve".to_string()),
        average_playtime: None,
        median_playtime: None,
        rating,
        publishers: vec!["Valve".to_string()],
        platforms: vec!["PC".to_string()],
    }
}

fn setup_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    for name in ["Valve", "Electronic Arts", "Nintendo"] {
        create_company(
            &conn,
            &NewCompany {
                name: name.to_string(),
                country: None,
                founded: None,
                description: None,
            },
        )
        .unwrap();
    }
    for (name, owner) in [("PC", None), ("Xbox 360", None), ("Switch", Some("Nintendo"))] {
        create_platform(
            &conn,
            &NewPlatform {
                name: name.to_string(),
                kind: "console".to_string(),
                release_date: "2005-11-22".to_string(),
                description: None,
                company: owner.map(str::to_string),
            },
        )
        .unwrap();
    }

    create_game(&conn, &new_game("Half-Life", "1998-11-19", Some(9.99), Some(96.0))).unwrap();
    create_game(&conn, &new_game("Half-Life 2", "2004-11-16", Some(9.99), Some(96.0))).unwrap();
    create_game(&conn, &new_game("Portal", "2007-10-10", Some(4.99), None)).unwrap();
    create_game(&conn, &new_game("Dota 2", "2013-07-09", Some(0.0), Some(90.0))).unwrap();
    create_game(&conn, &new_game("Artifact", "2018-11-28", None, Some(60.0))).unwrap();
    create_game(&conn, &new_game("100% Orange Juice", "2014-05-16", None, None)).unwrap();

    attach_platform(&conn, "Portal", "Xbox 360").unwrap();
    attach_publisher(&conn, "Portal", "Electronic Arts").unwrap();
    conn
}

fn titles(games: &[Game]) -> Vec<&str> {
    games.iter().map(|g| g.title.as_str()).collect()
}

#[test]
fn latest_games_newest_first() {
    let conn = setup_db();
    let latest = latest_games(&conn, 3).unwrap();
    assert_eq!(titles(&latest), ["Artifact", "100% Orange Juice", "Dota 2"]);

    let all = latest_games(&conn, LATEST_GAMES).unwrap();
    assert_eq!(all.len(), 6);
}

#[test]
fn search_returns_exactly_the_matching_titles() {
    let conn = setup_db();
    let found = search_games(&conn, "half").unwrap();
    assert_eq!(titles(&found), ["Half-Life", "Half-Life 2"]);

    let all = list_games(&conn, GameSort::Unsorted).unwrap();
    for needle in ["a", "Life", "o", "zzz", ""] {
        let found = search_games(&conn, needle).unwrap();
        let expected: Vec<&str> = all
            .iter()
            .map(|g| g.title.as_str())
            .filter(|t| t.to_lowercase().contains(&needle.to_lowercase()))
            .collect();
        let mut got = titles(&found);
        got.sort();
        let mut expected = expected;
        expected.sort();
        assert_eq!(got, expected, "needle {needle:?}");
    }
}

#[test]
fn search_treats_wildcards_literally() {
    let conn = setup_db();
    assert_eq!(titles(&search_games(&conn, "100%").unwrap()), ["100% Orange Juice"]);
    assert!(search_games(&conn, "%%%").unwrap().is_empty());
    assert!(search_games(&conn, "Half_Life").unwrap().is_empty());
}

#[test]
fn list_by_name() {
    let conn = setup_db();
    let games = list_games(&conn, GameSort::Name).unwrap();
    assert_eq!(
        titles(&games),
        ["100% Orange Juice", "Artifact", "Dota 2", "Half-Life", "Half-Life 2", "Portal"]
    );
}

#[test]
fn list_unsorted_is_insertion_order() {
    let conn = setup_db();
    let games = list_games(&conn, GameSort::Unsorted).unwrap();
    assert_eq!(titles(&games)[0], "Half-Life");
    assert_eq!(titles(&games)[5], "100% Orange Juice");
}

#[test]
fn list_by_date_newest_first() {
    let conn = setup_db();
    let games = list_games(&conn, GameSort::Date).unwrap();
    let dates: Vec<&str> = games.iter().map(|g| g.release_date.as_str()).collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
}

#[test]
fn price_order_is_total_with_nulls_last() {
    let conn = setup_db();
    let games = list_games(&conn, GameSort::Price).unwrap();
    assert_eq!(
        titles(&games),
        ["Dota 2", "Portal", "Half-Life", "Half-Life 2", "100% Orange Juice", "Artifact"]
    );
    for pair in games.windows(2) {
        match (pair[0].price, pair[1].price) {
            (Some(a), Some(b)) => assert!(a <= b),
            (None, Some(_)) => panic!("NULL price sorted before a priced game"),
            _ => {}
        }
    }
}

#[test]
fn rating_order_is_total_with_nulls_last() {
    let conn = setup_db();
    let games = list_games(&conn, GameSort::Rating).unwrap();
    assert_eq!(
        titles(&games),
        ["Half-Life", "Half-Life 2", "Dota 2", "Artifact", "100% Orange Juice", "Portal"]
    );
    for pair in games.windows(2) {
        match (pair[0].rating, pair[1].rating) {
            (Some(a), Some(b)) => assert!(a >= b),
            (None, Some(_)) => panic!("NULL rating sorted before a rated game"),
            _ => {}
        }
    }
}

#[test]
fn game_detail_collects_relations() {
    let conn = setup_db();
    let detail = game_detail(&conn, "Portal").unwrap().unwrap();
    assert_eq!(detail.game.title, "Portal");
    assert_eq!(detail.game.developer.as_deref(), Some("Valve"));
    assert_eq!(
        detail.publishers.iter().map(String::as_str).collect::<Vec<_>>(),
        ["Electronic Arts", "Valve"]
    );
    assert_eq!(
        detail.platforms.iter().map(String::as_str).collect::<Vec<_>>(),
        ["PC", "Xbox 360"]
    );
}

#[test]
fn game_detail_missing_title() {
    let conn = setup_db();
    assert!(game_detail(&conn, "Half-Life 3").unwrap().is_none());
}

#[test]
fn game_detail_without_relations() {
    let conn = setup_db();
    conn.execute(
        "INSERT INTO games (title, release_date) VALUES ('Ricochet', '2000-11-01')",
        [],
    )
    .unwrap();
    let detail = game_detail(&conn, "Ricochet").unwrap().unwrap();
    assert!(detail.publishers.is_empty());
    assert!(detail.platforms.is_empty());
    assert_eq!(detail.game.developer, None);
}

#[test]
fn company_and_platform_details() {
    let conn = setup_db();
    let valve = company_detail(&conn, "Valve").unwrap().unwrap();
    assert_eq!(valve.name, "Valve");
    assert!(company_detail(&conn, "Bungie").unwrap().is_none());

    let switch = platform_detail(&conn, "Switch").unwrap().unwrap();
    assert_eq!(switch.company.as_deref(), Some("Nintendo"));
    let pc = platform_detail(&conn, "PC").unwrap().unwrap();
    assert_eq!(pc.company, None);
    assert!(platform_detail(&conn, "Ouya").unwrap().is_none());
}

#[test]
fn listings_by_relation() {
    let conn = setup_db();
    assert_eq!(titles(&games_for_platform(&conn, "Xbox 360").unwrap()), ["Portal"]);
    assert_eq!(titles(&games_published_by(&conn, "Electronic Arts").unwrap()), ["Portal"]);
    assert_eq!(games_developed_by(&conn, "Valve").unwrap().len(), 6);
    assert!(games_developed_by(&conn, "Nintendo").unwrap().is_empty());
}

#[test]
fn list_companies_and_platforms_by_name() {
    let conn = setup_db();
    let companies: Vec<String> = list_companies(&conn).unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(companies, ["Electronic Arts", "Nintendo", "Valve"]);
    let platforms: Vec<String> = list_platforms(&conn).unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(platforms, ["PC", "Switch", "Xbox 360"]);
}

#[test]
fn stats_count_everything() {
    let conn = setup_db();
    let stats = catalog_stats(&conn).unwrap();
    assert_eq!(stats.companies, 3);
    assert_eq!(stats.platforms, 3);
    assert_eq!(stats.games, 6);
    assert_eq!(stats.publisher_links, 7);
    assert_eq!(stats.platform_links, 7);
    assert_eq!(stats.users, 0);
}
