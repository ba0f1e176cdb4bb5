//! Animation engine integration tests.
//!
//! Covers task progress over ticks and what happens when a new mutation
//! reaches an object that is still animating.

use rust_tabletop::core::{ObjectId, Point, Rect, TableConfig};
use rust_tabletop::objects::{BoardObject, ButtonAction, Dice, Image};
use rust_tabletop::sync::WireMessage;
use rust_tabletop::table::Table;

const HOLDER: ObjectId = ObjectId(10);
const RETRIEVE: ObjectId = ObjectId(11);
const DICE: ObjectId = ObjectId(12);
const LOOSE: ObjectId = ObjectId(5);

/// Cards 0..4 stacked, card 5 loose, a retrieve button for card 5, a die.
fn table(config: TableConfig) -> Table {
    let mut table = Table::new(config);
    let world = table.world_mut();
    for i in 0..6 {
        let rect = if ObjectId(i) == LOOSE { Rect::new(600, 100, 50, 70) } else { Rect::new(200, 200, 50, 70) };
        world.register(BoardObject::image(ObjectId(i), rect, Image::two_sided("f.png", "b.png"))).unwrap();
    }
    world.register(BoardObject::holder(HOLDER, Rect::new(200, 200, 60, 80))).unwrap();
    for i in 0..5 {
        world.add_to_holder(HOLDER, ObjectId(i)).unwrap();
    }
    world
        .register(BoardObject::button(
            RETRIEVE,
            Rect::new(300, 200, 40, 20),
            ButtonAction::Retrieve { holder: HOLDER, images: vec![LOOSE] },
        ))
        .unwrap();
    let faces = (1..=6).map(|i| format!("d{i}.png")).collect();
    world.register(BoardObject::dice(DICE, Rect::new(900, 100, 40, 40), Dice::new(faces))).unwrap();
    table
}

fn ticks(table: &mut Table, n: usize) -> usize {
    (0..n).map(|_| table.tick(&[]).unwrap().tasks_finished).sum()
}

// =============================================================================
// Move
// =============================================================================

/// Test that a retrieve flies the card over and stacks it face down.
#[test]
fn test_retrieve_move_lands_in_holder() {
    let mut t = table(TableConfig::new("alice").with_seed(1));
    t.world_mut().image_mut(LOOSE).unwrap().set_front(true);
    t.apply_remote(WireMessage::RetrieveButtonClicked { button_id: RETRIEVE }).unwrap();
    assert!(t.animator().is_animating(LOOSE));

    ticks(&mut t, 15);
    let halfway = t.world().rect(LOOSE).unwrap();
    assert!(halfway.x < 600 && halfway.x > 200);
    assert!(halfway.y > 100 && halfway.y < 200);
    assert!(!t.world().holder(HOLDER).unwrap().contains(LOOSE));

    assert_eq!(ticks(&mut t, 30), 1);
    assert!(t.animator().is_empty());
    assert_eq!(t.world().holder_top(HOLDER).unwrap(), Some(LOOSE));
    assert_eq!(t.world().rect(LOOSE).unwrap().top_left(), Point::new(200.0, 200.0));
    assert!(!t.world().image(LOOSE).unwrap().is_front);
    assert!(!t.world().resolve(LOOSE).unwrap().render);
}

/// Test that a move reaching an in-flight card settles the flight first.
#[test]
fn test_new_mutation_settles_move() {
    let mut t = table(TableConfig::new("alice").with_seed(1));
    t.apply_remote(WireMessage::RetrieveButtonClicked { button_id: RETRIEVE }).unwrap();
    ticks(&mut t, 5);

    t.apply_remote(WireMessage::RemoveImageFromHolder { image_id: LOOSE, holder_id: HOLDER }).unwrap();
    assert!(t.animator().is_empty());
    // The flight completed, then the removal applied on top of it
    assert!(!t.world().holder(HOLDER).unwrap().contains(LOOSE));
    assert!(t.world().resolve(LOOSE).unwrap().render);
    assert_eq!(t.world().rect(LOOSE).unwrap(), Rect::new(200, 200, 50, 70));
}

// =============================================================================
// Roll
// =============================================================================

/// Test that a roll jitters then rests on the chosen face where it started.
#[test]
fn test_roll_rests_on_result() {
    let mut t = table(TableConfig::new("alice").with_seed(4).with_roll_ticks(12));
    t.apply_remote(WireMessage::DiceRolled { dice_id: DICE, result: 5 }).unwrap();

    assert_eq!(ticks(&mut t, 11), 0);
    assert_eq!(ticks(&mut t, 1), 1);
    assert_eq!(t.world().dice(DICE).unwrap().current_face, 5);
    assert_eq!(t.world().rect(DICE).unwrap(), Rect::new(900, 100, 40, 40));
}

/// Test that a second roll finishes the first before starting.
#[test]
fn test_second_roll_settles_first() {
    let mut t = table(TableConfig::new("alice").with_seed(4));
    t.apply_remote(WireMessage::DiceRolled { dice_id: DICE, result: 1 }).unwrap();
    ticks(&mut t, 7);
    t.apply_remote(WireMessage::DiceRolled { dice_id: DICE, result: 2 }).unwrap();

    assert_eq!(t.animator().len(), 1);
    assert_eq!(t.world().rect(DICE).unwrap(), Rect::new(900, 100, 40, 40));
    ticks(&mut t, 100);
    assert_eq!(t.world().dice(DICE).unwrap().current_face, 2);
}

/// Test that an out-of-range result is rejected before animating.
#[test]
fn test_roll_rejects_missing_face() {
    let mut t = table(TableConfig::new("alice"));
    assert!(t.apply_remote(WireMessage::DiceRolled { dice_id: DICE, result: 6 }).is_err());
    assert!(t.animator().is_empty());
}

// =============================================================================
// Shuffle
// =============================================================================

/// Test that only the top cards are lifted while shuffling.
#[test]
fn test_shuffle_lifts_top_cards() {
    let mut t = table(TableConfig::new("alice").with_seed(9).with_shuffle(2, 3, 4));
    let deck: Vec<ObjectId> = [4, 2, 0, 3, 1].into_iter().map(ObjectId).collect();
    t.apply_remote(WireMessage::ShuffleHolder { holder_id: HOLDER, deck: deck.clone() }).unwrap();

    let shown: Vec<ObjectId> = (0..5).map(ObjectId).filter(|id| t.world().resolve(*id).unwrap().render).collect();
    assert_eq!(shown, vec![ObjectId(1), ObjectId(3)]);
    assert_eq!(t.world().holder(HOLDER).unwrap().to_vec(), deck);

    // Three phases of four ticks
    assert_eq!(ticks(&mut t, 11), 0);
    assert_eq!(ticks(&mut t, 1), 1);
    assert!((0..5).all(|i| !t.world().resolve(ObjectId(i)).unwrap().render));
    assert_eq!(t.world().holder(HOLDER).unwrap().to_vec(), deck);
}

/// Test that stacking onto a shuffling holder finishes the shuffle first.
#[test]
fn test_add_during_shuffle() {
    let mut t = table(TableConfig::new("alice").with_seed(9));
    let deck: Vec<ObjectId> = (0..5).rev().map(ObjectId).collect();
    t.apply_remote(WireMessage::ShuffleHolder { holder_id: HOLDER, deck: deck.clone() }).unwrap();
    ticks(&mut t, 3);

    t.apply_remote(WireMessage::AddImageToHolder { image_id: LOOSE, holder_id: HOLDER }).unwrap();
    assert!(t.animator().is_empty());
    let mut expected = deck;
    expected.push(LOOSE);
    assert_eq!(t.world().holder(HOLDER).unwrap().to_vec(), expected);
}

/// Test that exporting settles every running task.
#[test]
fn test_export_settles_tasks() {
    let mut t = table(TableConfig::new("alice").with_seed(2));
    for path in ["f.png", "b.png"].into_iter().map(String::from).chain((1..=6).map(|i| format!("d{i}.png"))) {
        t.add_asset(path.clone(), path.into_bytes());
    }
    t.apply_remote(WireMessage::DiceRolled { dice_id: DICE, result: 4 }).unwrap();
    t.apply_remote(WireMessage::RetrieveButtonClicked { button_id: RETRIEVE }).unwrap();
    ticks(&mut t, 2);

    let archive = t.export_snapshot().unwrap();
    assert!(t.animator().is_empty());
    let world = archive.load("bob").unwrap();
    assert_eq!(world.dice(DICE).unwrap().current_face, 4);
    assert_eq!(world.holder_top(HOLDER).unwrap(), Some(LOOSE));
}
