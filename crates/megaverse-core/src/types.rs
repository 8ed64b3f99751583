//! Core type definitions for the Megaverse grid

use serde::{Deserialize, Serialize};

use crate::{MegaverseError, Result};

/// Zero-based grid coordinate, row-major
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Kind of astral object, independent of any modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// POLYANET
    Basic,
    /// SOLOON, carries a color
    ColoredMarker,
    /// COMETH, carries a direction
    DirectionalMarker,
}

impl ObjectKind {
    /// Canonical uppercase object name as used in goal tokens
    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "POLYANET",
            Self::ColoredMarker => "SOLOON",
            Self::DirectionalMarker => "COMETH",
        }
    }

    /// Decode a remote type code
    pub fn from_type_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Basic),
            1 => Ok(Self::ColoredMarker),
            2 => Ok(Self::DirectionalMarker),
            other => Err(MegaverseError::UnknownObjectType(other)),
        }
    }

    /// REST collection for this kind (`polyanets`, `soloons`, `comeths`)
    pub fn endpoint(&self) -> String {
        format!("{}s", self.name().to_lowercase())
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = MegaverseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "POLYANET" => Ok(Self::Basic),
            "SOLOON" => Ok(Self::ColoredMarker),
            "COMETH" => Ok(Self::DirectionalMarker),
            _ => Err(MegaverseError::InvalidToken {
                token: s.to_string(),
                reason: "unknown astral object name".to_string(),
            }),
        }
    }
}

/// SOLOON color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Blue,
    Red,
    Purple,
    White,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::White => "white",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blue" => Ok(Self::Blue),
            "red" => Ok(Self::Red),
            "purple" => Ok(Self::Purple),
            "white" => Ok(Self::White),
            _ => Err(format!("Invalid color: {}", s)),
        }
    }
}

/// COMETH direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Right => "right",
            Self::Left => "left",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "right" => Ok(Self::Right),
            "left" => Ok(Self::Left),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// An object together with the modifier its kind demands
///
/// Color and direction live inside the variant, so a placement can never
/// carry both or carry the wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectSpec {
    Basic,
    ColoredMarker(Color),
    DirectionalMarker(Direction),
}

impl ObjectSpec {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Basic => ObjectKind::Basic,
            Self::ColoredMarker(_) => ObjectKind::ColoredMarker,
            Self::DirectionalMarker(_) => ObjectKind::DirectionalMarker,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Self::ColoredMarker(color) => Some(*color),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::DirectionalMarker(direction) => Some(*direction),
            _ => None,
        }
    }
}

/// Fully specified instruction to create one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub object: ObjectSpec,
    pub position: Position,
}

impl Placement {
    pub fn new(object: ObjectSpec, position: Position) -> Self {
        Self { object, position }
    }

    pub fn kind(&self) -> ObjectKind {
        self.object.kind()
    }

    pub fn color(&self) -> Option<Color> {
        self.object.color()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.object.direction()
    }
}

/// Symbolic target grid, row-major
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub goal: Vec<Vec<String>>,
}

impl Goal {
    pub fn new(goal: Vec<Vec<String>>) -> Self {
        Self { goal }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.goal
    }

    pub fn get(&self, position: Position) -> Option<&str> {
        self.goal
            .get(position.row)
            .and_then(|row| row.get(position.column))
            .map(String::as_str)
    }
}

/// Wire shape of `GET /map/{id}/goal`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalResponse {
    #[serde(default)]
    pub goal: Option<Vec<Vec<String>>>,
}

impl GoalResponse {
    /// Convert into a goal, rejecting a missing or empty grid
    pub fn into_goal(self) -> Result<Goal> {
        match self.goal {
            Some(rows) if !rows.is_empty() => Ok(Goal::new(rows)),
            _ => Err(MegaverseError::GoalMissing),
        }
    }
}

/// One occupied remote cell
///
/// Color and direction are kept as the raw strings the service reports and
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCell {
    #[serde(rename = "type")]
    pub type_code: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl RemoteCell {
    pub fn kind(&self) -> Result<ObjectKind> {
        ObjectKind::from_type_code(self.type_code)
    }
}

/// Live remote grid; `None` is an empty cell
pub type RemoteGrid = Vec<Vec<Option<RemoteCell>>>;

/// Wire shape of `GET /map/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct MapResponse {
    pub map: MapData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapData {
    pub content: RemoteGrid,
}

/// Body of a create/delete call on an object collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRequest {
    pub candidate_id: String,
    pub row: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl ObjectRequest {
    /// Deletion body: identity and position only
    pub fn at(candidate_id: &str, position: Position) -> Self {
        Self {
            candidate_id: candidate_id.to_string(),
            row: position.row,
            column: position.column,
            color: None,
            direction: None,
        }
    }

    /// Creation body for a placement
    pub fn for_placement(candidate_id: &str, placement: &Placement) -> Self {
        Self {
            color: placement.color(),
            direction: placement.direction(),
            ..Self::at(candidate_id, placement.position)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_type_codes() {
        assert_eq!(ObjectKind::from_type_code(0).unwrap(), ObjectKind::Basic);
        assert_eq!(ObjectKind::from_type_code(1).unwrap(), ObjectKind::ColoredMarker);
        assert_eq!(ObjectKind::from_type_code(2).unwrap(), ObjectKind::DirectionalMarker);
        assert!(matches!(
            ObjectKind::from_type_code(7),
            Err(MegaverseError::UnknownObjectType(7))
        ));
    }

    #[test]
    fn test_kind_endpoints() {
        assert_eq!(ObjectKind::Basic.endpoint(), "polyanets");
        assert_eq!(ObjectKind::ColoredMarker.endpoint(), "soloons");
        assert_eq!(ObjectKind::DirectionalMarker.endpoint(), "comeths");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("soloon".parse::<ObjectKind>().unwrap(), ObjectKind::ColoredMarker);
        assert_eq!("COMETH".parse::<ObjectKind>().unwrap(), ObjectKind::DirectionalMarker);
        assert!("SATURN".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn test_modifier_parsing() {
        assert_eq!("PURPLE".parse::<Color>().unwrap(), Color::Purple);
        assert_eq!("left".parse::<Direction>().unwrap(), Direction::Left);
        assert!("green".parse::<Color>().is_err());
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_goal_response_rejects_empty() {
        let missing: GoalResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(missing.into_goal(), Err(MegaverseError::GoalMissing)));

        let empty: GoalResponse = serde_json::from_str(r#"{"goal": []}"#).unwrap();
        assert!(matches!(empty.into_goal(), Err(MegaverseError::GoalMissing)));

        let ok: GoalResponse =
            serde_json::from_str(r#"{"goal": [["SPACE", "POLYANET"]]}"#).unwrap();
        let goal = ok.into_goal().unwrap();
        assert_eq!(goal.get(Position::new(0, 1)), Some("POLYANET"));
        assert_eq!(goal.get(Position::new(1, 0)), None);
    }

    #[test]
    fn test_map_response_decodes_null_cells() {
        let json = r#"{
            "map": {
                "_id": "abc",
                "content": [[null, {"type": 1, "color": "blue"}], [{"type": 2, "direction": "up"}, {"type": 0}]],
                "candidateId": "cand",
                "phase": 2,
                "__v": 0
            }
        }"#;
        let response: MapResponse = serde_json::from_str(json).unwrap();
        let content = response.map.content;
        assert!(content[0][0].is_none());
        assert_eq!(content[0][1].as_ref().unwrap().color.as_deref(), Some("blue"));
        assert_eq!(
            content[1][0].as_ref().unwrap().kind().unwrap(),
            ObjectKind::DirectionalMarker
        );
    }

    #[test]
    fn test_object_request_body() {
        let placement = Placement::new(ObjectSpec::ColoredMarker(Color::Red), Position::new(2, 3));
        let body = serde_json::to_value(ObjectRequest::for_placement("cand", &placement)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"candidateId": "cand", "row": 2, "column": 3, "color": "red"})
        );

        let delete = serde_json::to_value(ObjectRequest::at("cand", Position::new(0, 1))).unwrap();
        assert_eq!(delete, serde_json::json!({"candidateId": "cand", "row": 0, "column": 1}));
    }
}
