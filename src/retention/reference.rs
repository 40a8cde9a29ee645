//! The compiled-in reference ensemble: a synthetic stand-in of ten hand-written trees.
//!
//! These trees are not a trained model. Only the path of tree 7 (`rdb0_last_touched_diff`,
//! `size`, `rdb1_last_touched_diff`, `dump_number`, `glue`) and its leaf `15.0 / 2235.2`
//! come from the production ensemble; every other threshold and leaf was chosen by hand
//! so that fresh clauses are kept and stale ones discarded. Real tables are loaded from a
//! model file and published with [`crate::retention::model::install`].
//!
//! Node indices are written next to each record. Leaves are given as a weight and a
//! sample count; [`leaf`] divides them once when the table is built.

use crate::retention::features::Feature;
use crate::retention::tree::{Node, leaf, split};

/// Name reported for the reference ensemble.
pub(crate) const REFERENCE_NAME: &str = "reference-10";

static TREE_0: [Node; 23] = [
    /*  0 */ split(Feature::Rdb0LastTouchedDiff, 10042.5, 1, 16),
    /*  1 */ split(Feature::UsedForUipCreation, 0.5, 2, 11),
    /*  2 */ split(Feature::Size, 11.5, 3, 8),
    /*  3 */ split(Feature::GlueRelLong, 0.8125, 4, 5),
    /*  4 */ leaf(212.0, 1120.4),
    /*  5 */ split(Feature::Rdb1LastTouchedDiff, 18850.0, 6, 7),
    /*  6 */ leaf(640.0, 981.6),
    /*  7 */ leaf(377.3, 201.0),
    /*  8 */ split(Feature::DumpNumber, 6.5, 9, 10),
    /*  9 */ leaf(903.9, 788.0),
    /* 10 */ leaf(1510.6, 412.0),
    /* 11 */ split(Feature::RdbRelUsedForUipCreation, 0.5, 12, 15),
    /* 12 */ split(Feature::Glue, 7.5, 13, 14),
    /* 13 */ leaf(88.0, 1733.9),
    /* 14 */ leaf(301.0, 655.2),
    /* 15 */ leaf(24.0, 3120.7),
    /* 16 */ split(Feature::Rdb0ActRankingTop10, 3.5, 17, 20),
    /* 17 */ split(Feature::SumUip1Used, 12.5, 18, 19),
    /* 18 */ leaf(1020.2, 742.0),
    /* 19 */ leaf(418.0, 903.3),
    /* 20 */ split(Feature::SizeRel, 0.6354, 21, 22),
    /* 21 */ leaf(2211.7, 1690.0),
    /* 22 */ leaf(4410.2, 512.0),
];

static TREE_1: [Node; 25] = [
    /*  0 */ split(Feature::Size, 9.5, 1, 14),
    /*  1 */ split(Feature::Rdb0LastTouchedDiff, 7410.0, 2, 9),
    /*  2 */ split(Feature::Glue, 5.5, 3, 6),
    /*  3 */ split(Feature::Rdb0ActRanking, 48211.0, 4, 5),
    /*  4 */ leaf(130.4, 2671.0),
    /*  5 */ leaf(622.0, 1304.8),
    /*  6 */ split(Feature::UsedForUipCreation, 1.5, 7, 8),
    /*  7 */ leaf(871.0, 806.2),
    /*  8 */ leaf(205.1, 1187.0),
    /*  9 */ split(Feature::Rdb1ActRankingTop10, 2.5, 10, 13),
    /* 10 */ split(Feature::GlueRelQueue, 0.9731, 11, 12),
    /* 11 */ leaf(1177.0, 950.3),
    /* 12 */ leaf(2005.8, 881.0),
    /* 13 */ leaf(463.5, 1002.0),
    /* 14 */ split(Feature::RdbRelUsedForUipCreation, 0.5, 15, 22),
    /* 15 */ split(Feature::DumpNumber, 2.5, 16, 19),
    /* 16 */ split(Feature::SizeRel, 1.2085, 17, 18),
    /* 17 */ leaf(955.0, 1011.7),
    /* 18 */ leaf(1830.2, 1044.0),
    /* 19 */ split(Feature::Rdb0LastTouchedDiff, 21300.5, 20, 21),
    /* 20 */ leaf(2291.0, 1366.1),
    /* 21 */ leaf(5120.4, 603.0),
    /* 22 */ split(Feature::GlueRelLong, 1.4412, 23, 24),
    /* 23 */ leaf(97.0, 1590.6),
    /* 24 */ leaf(512.3, 780.0),
];

static TREE_2: [Node; 21] = [
    /*  0 */ split(Feature::Rdb1LastTouchedDiff, 8800.5, 1, 12),
    /*  1 */ split(Feature::Rdb0LastTouchedDiff, 9911.0, 2, 9),
    /*  2 */ split(Feature::SumUip1Used, 3.5, 3, 6),
    /*  3 */ split(Feature::Size, 7.5, 4, 5),
    /*  4 */ leaf(301.6, 1402.0),
    /*  5 */ leaf(905.0, 1077.4),
    /*  6 */ split(Feature::NumAntecedentsRel, 0.7723, 7, 8),
    /*  7 */ leaf(41.0, 1912.3),
    /*  8 */ leaf(190.7, 1240.0),
    /*  9 */ split(Feature::Glue, 9.5, 10, 11),
    /* 10 */ leaf(1008.0, 1093.6),
    /* 11 */ leaf(1666.1, 1004.0),
    /* 12 */ split(Feature::UsedForUipCreation, 2.5, 13, 18),
    /* 13 */ split(Feature::DumpNumber, 4.5, 14, 17),
    /* 14 */ split(Feature::AntecNumTotalLitsRel, 0.6631, 15, 16),
    /* 15 */ leaf(1230.0, 998.2),
    /* 16 */ leaf(1775.4, 860.0),
    /* 17 */ leaf(3321.9, 915.0),
    /* 18 */ split(Feature::Rdb0ActRankingTop10, 5.5, 19, 20),
    /* 19 */ leaf(480.2, 1111.0),
    /* 20 */ leaf(1302.0, 961.5),
];

static TREE_3: [Node; 21] = [
    /*  0 */ split(Feature::Rdb0LastTouchedDiff, 8820.5, 1, 14),
    /*  1 */ split(Feature::AntecedentsGlueLongRedsVar, 3.2417, 2, 9),
    /*  2 */ split(Feature::Size, 10.5, 3, 6),
    /*  3 */ split(Feature::Rdb1UsedForUipCreation, 0.5, 4, 5),
    /*  4 */ leaf(402.0, 1180.9),
    /*  5 */ leaf(155.3, 1822.0),
    /*  6 */ split(Feature::GlueRelQueue, 1.1069, 7, 8),
    /*  7 */ leaf(880.0, 905.6),
    /*  8 */ leaf(1240.3, 977.0),
    /*  9 */ split(Feature::UsedForUipCreation, 0.5, 10, 13),
    /* 10 */ split(Feature::DumpNumber, 3.5, 11, 12),
    /* 11 */ leaf(990.4, 1003.0),
    /* 12 */ leaf(1614.0, 872.7),
    /* 13 */ leaf(310.0, 1291.4),
    /* 14 */ split(Feature::Rdb1LastTouchedDiff, 15022.0, 15, 18),
    /* 15 */ split(Feature::SumUip1Used, 20.5, 16, 17),
    /* 16 */ leaf(1121.7, 1060.0),
    /* 17 */ leaf(702.0, 1188.3),
    /* 18 */ split(Feature::SizeRel, 0.8845, 19, 20),
    /* 19 */ leaf(1904.0, 1215.2),
    /* 20 */ leaf(3610.9, 747.0),
];

static TREE_4: [Node; 21] = [
    /*  0 */ split(Feature::UsedForUipCreation, 0.5, 1, 14),
    /*  1 */ split(Feature::Rdb0LastTouchedDiff, 6210.5, 2, 9),
    /*  2 */ split(Feature::GlueRelLong, 0.9122, 3, 6),
    /*  3 */ split(Feature::Size, 6.5, 4, 5),
    /*  4 */ leaf(281.0, 1604.4),
    /*  5 */ leaf(760.7, 1302.0),
    /*  6 */ split(Feature::DumpNumber, 1.5, 7, 8),
    /*  7 */ leaf(807.3, 980.0),
    /*  8 */ leaf(1290.0, 1033.8),
    /*  9 */ split(Feature::Rdb0ActRanking, 90123.5, 10, 13),
    /* 10 */ split(Feature::NumOverlapLiterals, 14.5, 11, 12),
    /* 11 */ leaf(1403.8, 1218.0),
    /* 12 */ leaf(1821.0, 1006.4),
    /* 13 */ leaf(4022.6, 688.0),
    /* 14 */ split(Feature::Rdb0ActRankingTop10, 4.5, 15, 18),
    /* 15 */ split(Feature::Glue, 6.5, 16, 17),
    /* 16 */ leaf(66.0, 2410.7),
    /* 17 */ leaf(340.1, 1550.0),
    /* 18 */ split(Feature::Rdb1LastTouchedDiff, 12050.0, 19, 20),
    /* 19 */ leaf(905.2, 1210.0),
    /* 20 */ leaf(1480.0, 1113.6),
];

static TREE_5: [Node; 21] = [
    /*  0 */ split(Feature::Rdb0LastTouchedDiff, 11880.0, 1, 14),
    /*  1 */ split(Feature::Size, 8.5, 2, 9),
    /*  2 */ split(Feature::NumOverlapLiteralsRel, 0.4418, 3, 6),
    /*  3 */ split(Feature::Rdb1LastTouchedDiff, 9120.5, 4, 5),
    /*  4 */ leaf(118.0, 2060.9),
    /*  5 */ leaf(603.4, 1210.0),
    /*  6 */ split(Feature::Glue, 4.5, 7, 8),
    /*  7 */ leaf(720.0, 1198.1),
    /*  8 */ leaf(1190.6, 1045.0),
    /*  9 */ split(Feature::RdbRelUsedForUipCreation, 0.5, 10, 13),
    /* 10 */ split(Feature::SizeRel, 0.9907, 11, 12),
    /* 11 */ leaf(1109.0, 1002.4),
    /* 12 */ leaf(2370.8, 1088.0),
    /* 13 */ leaf(402.6, 1140.0),
    /* 14 */ split(Feature::SumUip1Used, 6.5, 15, 18),
    /* 15 */ split(Feature::DumpNumber, 9.5, 16, 17),
    /* 16 */ leaf(2088.3, 1204.0),
    /* 17 */ leaf(4615.0, 701.9),
    /* 18 */ split(Feature::Rdb1ActRankingTop10, 1.5, 19, 20),
    /* 19 */ leaf(1630.7, 1152.0),
    /* 20 */ leaf(688.0, 1020.4),
];

static TREE_6: [Node; 21] = [
    /*  0 */ split(Feature::Rdb0ActRankingTop10, 2.5, 1, 12),
    /*  1 */ split(Feature::Rdb0LastTouchedDiff, 14800.5, 2, 9),
    /*  2 */ split(Feature::Size, 12.5, 3, 6),
    /*  3 */ split(Feature::GlueRelQueue, 0.8406, 4, 5),
    /*  4 */ leaf(96.0, 2504.1),
    /*  5 */ leaf(455.2, 1371.0),
    /*  6 */ split(Feature::UsedForUipCreation, 0.5, 7, 8),
    /*  7 */ leaf(1322.0, 1008.6),
    /*  8 */ leaf(610.9, 1203.0),
    /*  9 */ split(Feature::DumpNumber, 7.5, 10, 11),
    /* 10 */ leaf(1544.0, 1180.2),
    /* 11 */ leaf(2901.4, 940.0),
    /* 12 */ split(Feature::Rdb1LastTouchedDiff, 10412.0, 13, 18),
    /* 13 */ split(Feature::Glue, 8.5, 14, 17),
    /* 14 */ split(Feature::NumAntecedentsRel, 1.0384, 15, 16),
    /* 15 */ leaf(903.3, 1120.0),
    /* 16 */ leaf(1205.0, 1011.9),
    /* 17 */ leaf(1786.6, 1007.0),
    /* 18 */ split(Feature::RdbRelUsedForUipCreation, 0.5, 19, 20),
    /* 19 */ leaf(3010.0, 1022.5),
    /* 20 */ leaf(790.1, 1004.0),
];

static TREE_7: [Node; 25] = [
    /*  0 */ split(Feature::Rdb0LastTouchedDiff, 9349.5, 1, 18),
    /*  1 */ split(Feature::Size, 8.5, 2, 13),
    /*  2 */ split(Feature::Rdb1LastTouchedDiff, 9273.5, 3, 10),
    /*  3 */ split(Feature::DumpNumber, 3.5, 4, 7),
    /*  4 */ split(Feature::Glue, 4.5, 5, 6),
    /*  5 */ leaf(15.0, 2235.2),
    /*  6 */ leaf(181.0, 1920.3),
    /*  7 */ split(Feature::UsedForUipCreation, 0.5, 8, 9),
    /*  8 */ leaf(1003.1, 990.0),
    /*  9 */ leaf(244.0, 1408.6),
    /* 10 */ split(Feature::Rdb1ActRankingTop10, 2.5, 11, 12),
    /* 11 */ leaf(1200.4, 1101.0),
    /* 12 */ leaf(650.0, 1162.7),
    /* 13 */ split(Feature::GlueRelLong, 1.0217, 14, 17),
    /* 14 */ split(Feature::SumUip1Used, 9.5, 15, 16),
    /* 15 */ leaf(1011.0, 977.3),
    /* 16 */ leaf(471.0, 1408.1),
    /* 17 */ leaf(1890.5, 1020.0),
    /* 18 */ split(Feature::UsedForUipCreation, 1.5, 19, 22),
    /* 19 */ split(Feature::SizeRel, 1.132, 20, 21),
    /* 20 */ leaf(2210.0, 1300.7),
    /* 21 */ leaf(3902.3, 820.0),
    /* 22 */ split(Feature::Rdb0ActRanking, 61004.0, 23, 24),
    /* 23 */ leaf(540.8, 1173.0),
    /* 24 */ leaf(1418.0, 1099.6),
];

static TREE_8: [Node; 19] = [
    /*  0 */ split(Feature::Size, 10.5, 1, 12),
    /*  1 */ split(Feature::Rdb1LastTouchedDiff, 11002.0, 2, 9),
    /*  2 */ split(Feature::NumTotalLitsAntecedents, 45.5, 3, 6),
    /*  3 */ split(Feature::Rdb0LastTouchedDiff, 12010.5, 4, 5),
    /*  4 */ leaf(140.9, 1877.0),
    /*  5 */ leaf(877.0, 1030.2),
    /*  6 */ split(Feature::Glue, 6.5, 7, 8),
    /*  7 */ leaf(690.2, 1141.0),
    /*  8 */ leaf(1302.0, 1116.3),
    /*  9 */ split(Feature::DumpNumber, 5.5, 10, 11),
    /* 10 */ leaf(1218.0, 1083.4),
    /* 11 */ leaf(2487.7, 1002.0),
    /* 12 */ split(Feature::UsedForUipCreation, 0.5, 13, 16),
    /* 13 */ split(Feature::Rdb0ActRankingTop10, 6.5, 14, 15),
    /* 14 */ leaf(1810.0, 1204.6),
    /* 15 */ leaf(3301.2, 833.0),
    /* 16 */ split(Feature::GlueRelQueue, 1.2931, 17, 18),
    /* 17 */ leaf(520.5, 1190.0),
    /* 18 */ leaf(1088.0, 1007.7),
];

static TREE_9: [Node; 19] = [
    /*  0 */ split(Feature::Rdb0LastTouchedDiff, 7702.5, 1, 12),
    /*  1 */ split(Feature::Glue, 6.5, 2, 7),
    /*  2 */ split(Feature::RdbRelUsedForUipCreation, 0.5, 3, 6),
    /*  3 */ split(Feature::Size, 5.5, 4, 5),
    /*  4 */ leaf(266.0, 1501.3),
    /*  5 */ leaf(801.9, 1189.0),
    /*  6 */ leaf(33.0, 2870.2),
    /*  7 */ split(Feature::AntecNumTotalLitsRel, 0.9044, 8, 11),
    /*  8 */ split(Feature::Rdb1UsedForUipCreation, 1.5, 9, 10),
    /*  9 */ leaf(1060.7, 1012.0),
    /* 10 */ leaf(402.0, 1230.8),
    /* 11 */ leaf(1520.0, 1006.3),
    /* 12 */ split(Feature::Rdb1LastTouchedDiff, 13901.5, 13, 16),
    /* 13 */ split(Feature::NumOverlapLiterals, 20.5, 14, 15),
    /* 14 */ leaf(1303.4, 1180.0),
    /* 15 */ leaf(906.0, 1040.1),
    /* 16 */ split(Feature::SumUip1Used, 14.5, 17, 18),
    /* 17 */ leaf(3440.0, 990.4),
    /* 18 */ leaf(1111.2, 1200.0),
];

/// The ten reference arenas, in vote order.
pub(crate) static REFERENCE_TREES: [&[Node]; 10] = [
    &TREE_0, &TREE_1, &TREE_2, &TREE_3, &TREE_4, &TREE_5, &TREE_6, &TREE_7, &TREE_8, &TREE_9,
];
