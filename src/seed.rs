// Seed data loaded into a fresh sportsbook
//
// Times are relative to process start so the board always has upcoming,
// live and final fixtures.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::*;

type Line<'a> = &'a [(&'a str, Decimal)];

fn market(market_type: MarketType, line: Line) -> Market {
    Market {
        market_type,
        options: line
            .iter()
            .map(|(label, odds)| MarketOption {
                label: label.to_string(),
                odds: *odds,
                value: None,
            })
            .collect(),
    }
}

/// Spread options carry the handicap in `value` (the last token of the label)
fn spread(line: Line) -> Market {
    let mut m = market(MarketType::Spread, line);
    for option in &mut m.options {
        option.value = option.label.rsplit(' ').next().map(str::to_string);
    }
    m
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    id: &str,
    sport: Sport,
    league: &str,
    home: &str,
    away: &str,
    start_offset_minutes: i64,
    status: MatchStatus,
    score: (u32, u32),
    moneyline: Line,
    spread_line: Line,
    totals: Line,
) -> Match {
    Match {
        id: id.to_string(),
        sport,
        league: league.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        start_time: Utc::now() + Duration::minutes(start_offset_minutes),
        status,
        home_score: score.0,
        away_score: score.1,
        markets: vec![
            market(MarketType::Moneyline, moneyline),
            spread(spread_line),
            market(MarketType::OverUnder, totals),
        ],
    }
}

pub fn initial_matches() -> Vec<Match> {
    use MatchStatus::*;
    use Sport::*;

    vec![
        // ===== NFL =====
        fixture(
            "nfl-1",
            Nfl,
            "NFL",
            "Kansas City Chiefs",
            "Buffalo Bills",
            120,
            Upcoming,
            (0, 0),
            &[("Chiefs", dec!(1.85)), ("Bills", dec!(2.05))],
            &[("Chiefs -3.5", dec!(1.91)), ("Bills +3.5", dec!(1.91))],
            &[("Over 48.5", dec!(1.87)), ("Under 48.5", dec!(1.95))],
        ),
        fixture(
            "nfl-2",
            Nfl,
            "NFL",
            "San Francisco 49ers",
            "Philadelphia Eagles",
            -30,
            Live,
            (14, 10),
            &[("49ers", dec!(1.65)), ("Eagles", dec!(2.35))],
            &[("49ers -4.5", dec!(1.88)), ("Eagles +4.5", dec!(1.94))],
            &[("Over 51.5", dec!(1.90)), ("Under 51.5", dec!(1.92))],
        ),
        fixture(
            "nfl-3",
            Nfl,
            "NFL",
            "Dallas Cowboys",
            "Miami Dolphins",
            24 * 60,
            Upcoming,
            (0, 0),
            &[("Cowboys", dec!(2.10)), ("Dolphins", dec!(1.78))],
            &[("Cowboys +2.5", dec!(1.89)), ("Dolphins -2.5", dec!(1.93))],
            &[("Over 52.5", dec!(1.85)), ("Under 52.5", dec!(1.97))],
        ),
        fixture(
            "nfl-4",
            Nfl,
            "NFL",
            "Baltimore Ravens",
            "Cincinnati Bengals",
            -180,
            Final,
            (28, 24),
            &[("Ravens", dec!(1.55)), ("Bengals", dec!(2.55))],
            &[("Ravens -6.5", dec!(1.91)), ("Bengals +6.5", dec!(1.91))],
            &[("Over 47.5", dec!(1.88)), ("Under 47.5", dec!(1.94))],
        ),
        // ===== NBA =====
        fixture(
            "nba-1",
            Nba,
            "NBA",
            "Los Angeles Lakers",
            "Boston Celtics",
            240,
            Upcoming,
            (0, 0),
            &[("Lakers", dec!(2.15)), ("Celtics", dec!(1.75))],
            &[("Lakers +4.5", dec!(1.90)), ("Celtics -4.5", dec!(1.92))],
            &[("Over 225.5", dec!(1.91)), ("Under 225.5", dec!(1.91))],
        ),
        fixture(
            "nba-2",
            Nba,
            "NBA",
            "Golden State Warriors",
            "Phoenix Suns",
            -45,
            Live,
            (58, 52),
            &[("Warriors", dec!(1.70)), ("Suns", dec!(2.20))],
            &[("Warriors -3.5", dec!(1.88)), ("Suns +3.5", dec!(1.94))],
            &[("Over 228.5", dec!(1.87)), ("Under 228.5", dec!(1.95))],
        ),
        fixture(
            "nba-3",
            Nba,
            "NBA",
            "Milwaukee Bucks",
            "Denver Nuggets",
            360,
            Upcoming,
            (0, 0),
            &[("Bucks", dec!(1.95)), ("Nuggets", dec!(1.88))],
            &[("Bucks -1.5", dec!(1.91)), ("Nuggets +1.5", dec!(1.91))],
            &[("Over 232.5", dec!(1.90)), ("Under 232.5", dec!(1.92))],
        ),
        fixture(
            "nba-4",
            Nba,
            "NBA",
            "Miami Heat",
            "Brooklyn Nets",
            -120,
            Final,
            (112, 105),
            &[("Heat", dec!(1.80)), ("Nets", dec!(2.05))],
            &[("Heat -2.5", dec!(1.89)), ("Nets +2.5", dec!(1.93))],
            &[("Over 218.5", dec!(1.88)), ("Under 218.5", dec!(1.94))],
        ),
        // ===== EPL =====
        fixture(
            "epl-1",
            Epl,
            "Premier League",
            "Manchester City",
            "Arsenal",
            180,
            Upcoming,
            (0, 0),
            &[("Man City", dec!(1.75)), ("Draw", dec!(3.80)), ("Arsenal", dec!(4.50))],
            &[("Man City -1.5", dec!(2.10)), ("Arsenal +1.5", dec!(1.78))],
            &[("Over 2.5", dec!(1.72)), ("Under 2.5", dec!(2.15))],
        ),
        fixture(
            "epl-2",
            Epl,
            "Premier League",
            "Liverpool",
            "Chelsea",
            -20,
            Live,
            (2, 1),
            &[("Liverpool", dec!(1.45)), ("Draw", dec!(4.20)), ("Chelsea", dec!(7.00))],
            &[("Liverpool -1.5", dec!(1.95)), ("Chelsea +1.5", dec!(1.88))],
            &[("Over 3.5", dec!(2.05)), ("Under 3.5", dec!(1.80))],
        ),
        fixture(
            "epl-3",
            Epl,
            "Premier League",
            "Manchester United",
            "Tottenham",
            48 * 60,
            Upcoming,
            (0, 0),
            &[("Man Utd", dec!(2.40)), ("Draw", dec!(3.50)), ("Tottenham", dec!(2.90))],
            &[("Man Utd -0.5", dec!(2.20)), ("Tottenham +0.5", dec!(1.70))],
            &[("Over 2.5", dec!(1.85)), ("Under 2.5", dec!(1.98))],
        ),
        fixture(
            "epl-4",
            Epl,
            "Premier League",
            "Newcastle",
            "Aston Villa",
            -240,
            Final,
            (3, 1),
            &[("Newcastle", dec!(1.90)), ("Draw", dec!(3.60)), ("Aston Villa", dec!(4.00))],
            &[("Newcastle -1.5", dec!(2.35)), ("Aston Villa +1.5", dec!(1.60))],
            &[("Over 2.5", dec!(1.78)), ("Under 2.5", dec!(2.08))],
        ),
    ]
}

/// (id, username, email, balance, status, kyc verified, account age in days)
type UserRow<'a> = (&'a str, &'a str, &'a str, Decimal, UserStatus, bool, i64);

pub fn initial_users() -> Vec<User> {
    use UserStatus::*;

    let rows: [UserRow; 4] = [
        ("user-1", "user", "user@demo.com", dec!(250), Active, true, 30),
        ("user-2", "jackparrot", "jack@pirates.com", dec!(500), Active, true, 20),
        ("user-3", "seawolf", "seawolf@ocean.com", dec!(125), Active, false, 15),
        ("user-4", "redbeard", "redbeard@treasure.com", dec!(0), Suspended, true, 45),
    ];
    rows.into_iter()
        .map(|(id, username, email, balance, status, kyc, age_days)| User {
            id: id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            balance,
            status,
            kyc_verified: kyc,
            created_at: Utc::now() - Duration::days(age_days),
        })
        .collect()
}

fn message(id: &str, sender: MessageSender, text: &str, hours_ago: i64) -> TicketMessage {
    TicketMessage {
        id: id.to_string(),
        sender,
        message: text.to_string(),
        timestamp: Utc::now() - Duration::hours(hours_ago),
    }
}

pub fn initial_tickets() -> Vec<SupportTicket> {
    use MessageSender::{Agent, User as Customer};

    vec![
        SupportTicket {
            id: "ticket-1".into(),
            user_id: "user-2".into(),
            subject: "Bet not showing in history".into(),
            status: TicketStatus::Open,
            priority: TicketPriority::High,
            created_at: Utc::now() - Duration::hours(2),
            messages: vec![message(
                "m1",
                Customer,
                "I placed a bet on the Chiefs game but it's not showing in my bet history. \
                 Can you help?",
                2,
            )],
            assigned_to: None,
        },
        SupportTicket {
            id: "ticket-2".into(),
            user_id: "user-3".into(),
            subject: "KYC verification pending".into(),
            status: TicketStatus::Pending,
            priority: TicketPriority::Medium,
            created_at: Utc::now() - Duration::hours(24),
            messages: vec![
                message(
                    "m1",
                    Customer,
                    "I submitted my documents 3 days ago but KYC is still pending.",
                    24,
                ),
                message(
                    "m2",
                    Agent,
                    "Thank you for reaching out. We're reviewing your documents and will \
                     update you shortly.",
                    20,
                ),
            ],
            assigned_to: Some("Agent Mike".into()),
        },
        SupportTicket {
            id: "ticket-3".into(),
            user_id: "user-1".into(),
            subject: "Question about odds calculation".into(),
            status: TicketStatus::Resolved,
            priority: TicketPriority::Low,
            created_at: Utc::now() - Duration::hours(72),
            messages: vec![
                message("m1", Customer, "How are parlay odds calculated?", 72),
                message(
                    "m2",
                    Agent,
                    "Great question! Parlay odds are calculated by multiplying the decimal \
                     odds of each selection together.",
                    70,
                ),
                message("m3", Customer, "That makes sense, thank you!", 69),
            ],
            assigned_to: Some("Agent Sarah".into()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_shape() {
        let matches = initial_matches();
        assert_eq!(matches.len(), 12);
        assert_eq!(matches.iter().filter(|m| m.status == MatchStatus::Live).count(), 3);
        assert!(matches.iter().all(|m| m.markets.len() == 3));
        assert!(matches
            .iter()
            .flat_map(|m| &m.markets)
            .flat_map(|mk| &mk.options)
            .all(|o| o.odds >= Decimal::ONE));

        let users = initial_users();
        assert_eq!(users[0].id, "user-1");
        assert_eq!(users[0].balance, dec!(250));
        assert_eq!(initial_tickets().len(), 3);
    }

    #[test]
    fn test_spread_value_is_handicap() {
        let chiefs = &initial_matches()[0];
        let line = chiefs.market(MarketType::Spread).unwrap();
        assert_eq!(line.options[0].value.as_deref(), Some("-3.5"));
        assert_eq!(line.options[1].value.as_deref(), Some("+3.5"));
    }
}
