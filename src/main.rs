fn main() {
    bolt_brawler::game::run();
}
